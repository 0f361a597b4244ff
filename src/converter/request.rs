use serde_json::Value;

use super::types::{Header, RequestTemplate};

/// Build the request template for one operation.
///
/// The `Content-Type` header comes from the lexically first content type of
/// the request body so the result does not depend on map iteration order.
pub fn build_request_template(
    server_url: Option<&str>,
    path: &str,
    method: &str,
    request_body: Option<&Value>,
) -> RequestTemplate {
    let base = server_url.unwrap_or_default().trim_end_matches('/');
    let mut headers = Vec::new();
    if let Some(content_type) = request_body
        .and_then(|body| body.get("content"))
        .and_then(Value::as_object)
        .and_then(|content| content.keys().min())
    {
        headers.push(Header {
            key: "Content-Type".to_string(),
            value: content_type.clone(),
        });
    }
    RequestTemplate {
        url: format!("{base}{path}"),
        method: method.to_uppercase(),
        headers,
    }
}
