use askama::Template;

use super::merge::MergePlan;
use super::naming::{doc_inline, doc_lines, raw_string_literal, string_literal};
use crate::converter::Tool;
use crate::error::{GenError, Result};

/// One `RESPONSE_TEMPLATE_<suffix>` constant.
#[derive(Debug, Clone)]
pub struct ResponseConst {
    pub suffix: String,
    pub status_code: String,
    pub content_type: String,
    /// Raw string literal holding the Markdown.
    pub literal: String,
}

/// `(key, value)` pair already rendered as string literals.
#[derive(Debug, Clone)]
pub struct HeaderLiteral {
    pub key: String,
    pub value: String,
}

/// Template data for one merge-managed tool module
#[derive(Template)]
#[template(path = "tool.rs.txt", escape = "none")]
pub struct ToolTemplateData {
    pub tool_name: String,
    pub doc_lines: Vec<String>,
    pub handler_name: String,
    pub imports: String,
    pub name_literal: String,
    pub description_literal: String,
    pub input_schema_literal: String,
    pub responses: Vec<ResponseConst>,
    pub method_literal: String,
    pub url_literal: String,
    pub headers: Vec<HeaderLiteral>,
    pub request_type: String,
    pub result_type: String,
    pub handler_body: String,
}

/// Default handler body for a tool nobody has implemented yet
#[derive(Template)]
#[template(path = "handler_body.rs.txt", escape = "none")]
pub struct HandlerBodyTemplate;

/// Template data for `<tools_module>/mod.rs`
#[derive(Template)]
#[template(path = "tools_mod.rs.txt", escape = "none")]
pub struct ToolsModTemplateData {
    pub modules: Vec<String>,
    pub request_type: String,
}

/// Template data for `server.rs`
#[derive(Template)]
#[template(path = "server.rs.txt", escape = "none")]
pub struct ServerTemplateData {
    pub tools_module: String,
    pub name_literal: String,
    pub version_literal: String,
}

/// Template data for generating Cargo.toml
#[derive(Template)]
#[template(path = "Cargo.toml.txt", escape = "none")]
pub struct CargoTomlTemplateData {
    pub name: String,
}

/// Template data for generating lib.rs
#[derive(Template)]
#[template(path = "lib.rs.txt", escape = "none")]
pub struct LibRsTemplateData {
    pub title: String,
    pub tools_module: String,
}

fn render<T: Template>(template: &'static str, data: &T) -> Result<String> {
    let mut rendered = data
        .render()
        .map_err(|source| GenError::Render { template, source })?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

/// Import block of a freshly generated tool module.
pub fn default_imports(request_type: &str) -> String {
    format!(
        "use serde_json::Value;\nuse tower_mcp::{{CallToolResult, Error, RequestContext, Tool, ToolBuilder}};\n\nuse super::{request_type};"
    )
}

/// Body of a freshly generated handler, `{` through `}`.
pub fn default_handler_body() -> Result<String> {
    Ok(render("handler_body.rs.txt", &HandlerBodyTemplate)?
        .trim_end()
        .to_string())
}

/// Render a tool module around the imports and body chosen by the merge.
pub fn render_tool(
    tool: &Tool,
    handler_name: &str,
    request_type: &str,
    result_type: &str,
    plan: &MergePlan,
) -> Result<String> {
    let mut lines = doc_lines(&tool.description);
    if lines.iter().all(String::is_empty) {
        lines = vec!["No description in the API document.".to_string()];
    }
    let data = ToolTemplateData {
        tool_name: doc_inline(&tool.name),
        doc_lines: lines,
        handler_name: handler_name.to_string(),
        imports: plan.imports.clone(),
        name_literal: string_literal(&tool.name),
        description_literal: string_literal(&tool.description),
        input_schema_literal: raw_string_literal(&tool.input_schema),
        responses: tool
            .responses
            .iter()
            .map(|variant| ResponseConst {
                suffix: variant.suffix.clone(),
                status_code: doc_inline(&variant.status_code),
                content_type: doc_inline(&variant.content_type),
                literal: raw_string_literal(&variant.body),
            })
            .collect(),
        method_literal: string_literal(&tool.request.method),
        url_literal: string_literal(&tool.request.url),
        headers: tool
            .request
            .headers
            .iter()
            .map(|h| HeaderLiteral {
                key: string_literal(&h.key),
                value: string_literal(&h.value),
            })
            .collect(),
        request_type: request_type.to_string(),
        result_type: result_type.to_string(),
        handler_body: plan.handler_body.clone(),
    };
    render("tool.rs.txt", &data)
}

pub fn render_tools_mod(modules: &[String], request_type: &str) -> Result<String> {
    render(
        "tools_mod.rs.txt",
        &ToolsModTemplateData {
            modules: modules.to_vec(),
            request_type: request_type.to_string(),
        },
    )
}

pub fn render_server(tools_module: &str, name: &str, version: &str) -> Result<String> {
    render(
        "server.rs.txt",
        &ServerTemplateData {
            tools_module: tools_module.to_string(),
            name_literal: string_literal(name),
            version_literal: string_literal(version),
        },
    )
}

pub fn render_cargo_toml(name: &str) -> Result<String> {
    render(
        "Cargo.toml.txt",
        &CargoTomlTemplateData {
            name: name.to_string(),
        },
    )
}

pub fn render_lib_rs(title: &str, tools_module: &str) -> Result<String> {
    render(
        "lib.rs.txt",
        &LibRsTemplateData {
            title: doc_inline(title),
            tools_module: tools_module.to_string(),
        },
    )
}
