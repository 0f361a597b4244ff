#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cmp::Ordering;

use serde_json::{json, Value};

use super::*;
use crate::error::GenError;
use crate::schema::Schema;
use crate::spec::{parse_document, ApiDocument};

const TODO_SPEC: &str = r#"
openapi: 3.0.3
info:
  title: Todo API
  version: 1.0.0
servers:
  - url: https://api.example.com/
paths:
  /todos/{id}:
    get:
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        "404":
          description: Not found
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'
        "200":
          description: The todo
          content:
            application/json:
              schema:
                type: object
                properties:
                  id:
                    type: string
                  title:
                    type: string
components:
  schemas:
    Error:
      type: object
      properties:
        message:
          type: string
          description: What went wrong
"#;

fn todo_doc() -> ApiDocument {
    parse_document(TODO_SPEC, false).unwrap()
}

#[test]
fn test_single_get_scenario() {
    let tools = convert_document(&todo_doc(), &ConvertOptions::default()).unwrap();
    assert_eq!(tools.len(), 1);
    let tool = &tools[0];
    assert_eq!(tool.name, "get_todos_id");
    assert_eq!(tool.args.len(), 1);
    assert_eq!(tool.args[0].name, "id");
    assert!(tool.args[0].required);
    assert_eq!(tool.args[0].source, ArgSource::Path);

    let schema: Value = serde_json::from_str(&tool.input_schema).unwrap();
    assert_eq!(
        schema,
        json!({
            "type": "object",
            "properties": { "id": { "type": "string" } },
            "required": ["id"]
        })
    );

    let variants: Vec<_> = tool
        .responses
        .iter()
        .map(|r| (r.status_code.as_str(), r.suffix.as_str()))
        .collect();
    assert_eq!(variants, vec![("200", "A"), ("404", "B")]);

    assert_eq!(tool.request.url, "https://api.example.com/todos/{id}");
    assert_eq!(tool.request.method, "GET");
    assert!(tool.request.headers.is_empty());
}

#[test]
fn test_response_markdown_layout() {
    let tools = convert_document(&todo_doc(), &ConvertOptions::default()).unwrap();
    let not_found = &tools[0].responses[1].body;
    let expected = "\
# API Response Information

Below is the response template for this API endpoint.

The template shows a possible response, including its status code and content type, to help you understand and generate correct outputs.

**Status Code:** 404

**Content-Type:** application/json

> Not found

## Response Structure

- Structure (Type: object):
  - **message**: What went wrong (Type: string):
";
    assert_eq!(not_found, expected);
}

#[test]
fn test_multi_content_type_body_scenario() {
    let doc = parse_document(
        r#"
openapi: 3.0.3
info: { title: T, version: "1" }
paths:
  /todos:
    post:
      operationId: createTodo
      summary: Create
      description: Creates a todo
      requestBody:
        required: true
        content:
          application/xml:
            schema: { type: object, title: TodoXml }
          application/json:
            schema: { type: object, description: Todo payload }
      responses: {}
"#,
        false,
    )
    .unwrap();
    let tools = convert_document(&doc, &ConvertOptions::default()).unwrap();
    let tool = &tools[0];
    assert_eq!(tool.name, "createTodo");
    assert_eq!(tool.description, "Create - Creates a todo");

    let body = &tool.args[0];
    assert_eq!(body.name, "body");
    assert_eq!(body.source, ArgSource::Body);
    assert!(body.required);

    let schema: Value = serde_json::from_str(&tool.input_schema).unwrap();
    let branches = schema["properties"]["body"]["oneOf"].as_array().unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0]["description"], json!("[application/json] Todo payload"));
    assert_eq!(branches[1]["title"], json!("[application/xml] TodoXml"));
    assert_eq!(schema["required"], json!(["body"]));

    assert_eq!(tool.request.headers[0].value, "application/json");
}

#[test]
fn test_single_content_type_body_keeps_map() {
    let doc = parse_document(
        r#"
openapi: 3.0.3
info: { title: T, version: "1" }
paths:
  /todos:
    put:
      requestBody:
        content:
          application/json:
            schema: { type: object }
"#,
        false,
    )
    .unwrap();
    let tools = convert_document(&doc, &ConvertOptions::default()).unwrap();
    match &tools[0].args[0].schema {
        ArgSchema::ByContentType(map) => assert_eq!(map.len(), 1),
        other => panic!("unexpected {other:?}"),
    }
    let schema: Value = serde_json::from_str(&tools[0].input_schema).unwrap();
    assert_eq!(schema["properties"]["body"], json!({ "type": "object" }));
    assert!(schema.get("required").is_none());
}

#[test]
fn test_body_without_schema_is_omitted() {
    let doc = parse_document(
        r#"
openapi: 3.0.3
info: { title: T, version: "1" }
paths:
  /upload:
    post:
      requestBody:
        content:
          application/octet-stream: {}
"#,
        false,
    )
    .unwrap();
    let tools = convert_document(&doc, &ConvertOptions::default()).unwrap();
    assert!(tools[0].args.is_empty());
    // The header still reflects the declared content type.
    assert_eq!(tools[0].request.headers[0].value, "application/octet-stream");
}

#[test]
fn test_parameters_without_schema_are_skipped() {
    let doc = ApiDocument::new(json!({
        "paths": {
            "/s": {
                "get": {
                    "parameters": [
                        { "name": "q", "in": "query" },
                        { "name": "limit", "in": "query", "schema": { "type": "integer" } },
                        { "name": "ref", "in": "query", "schema": { "$ref": "#/components/schemas/Gone" } },
                        { "name": "weird", "in": "matrix", "schema": { "type": "string" } },
                        { "name": "filter", "in": "query",
                          "content": { "application/json": { "schema": { "type": "object" } } } }
                    ]
                }
            }
        }
    }));
    let tools = convert_document(&doc, &ConvertOptions::default()).unwrap();
    let names: Vec<_> = tools[0].args.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["filter", "limit"]);
}

#[test]
fn test_tools_and_args_sorted_by_name() {
    let doc = ApiDocument::new(json!({
        "paths": {
            "/b": { "get": { "operationId": "zeta",
                "parameters": [
                    { "name": "z", "in": "query", "schema": { "type": "string" } },
                    { "name": "a", "in": "query", "schema": { "type": "string" }, "required": true }
                ] } },
            "/a": { "get": { "operationId": "alpha" }, "post": { "operationId": "mid" } }
        }
    }));
    let tools = convert_document(&doc, &ConvertOptions::default()).unwrap();
    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    let args: Vec<_> = tools[2].args.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(args, vec!["a", "z"]);
}

#[test]
fn test_dangling_combinator_aborts_conversion() {
    let doc = ApiDocument::new(json!({
        "paths": {
            "/a": { "get": { "responses": { "200": { "description": "ok", "content": {
                "application/json": { "schema": { "oneOf": [{ "$ref": "#/components/schemas/None" }] } }
            } } } } }
        }
    }));
    let err = convert_document(&doc, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, GenError::DanglingCombinator { .. }));
}

#[test]
fn test_server_url_override() {
    let options = ConvertOptions {
        server_url: Some("http://localhost:8080/".into()),
    };
    let tools = convert_document(&todo_doc(), &options).unwrap();
    assert_eq!(tools[0].request.url, "http://localhost:8080/todos/{id}");
}

#[test]
fn test_synthesized_names() {
    assert_eq!(synthesize_tool_name("POST", "/foo/{bar}"), "post_foo_bar");
    assert_eq!(synthesize_tool_name("get", "/"), "get");
    assert_eq!(synthesize_tool_name("get", "/v1/user-profile/{user.id}"), "get_v1_user_profile_user_id");
}

#[test]
fn test_description_joining() {
    assert_eq!(tool_description(Some("S"), Some("D")), "S - D");
    assert_eq!(tool_description(Some("S"), None), "S");
    assert_eq!(tool_description(None, Some("D")), "D");
    assert_eq!(tool_description(None, None), "");
}

#[test]
fn test_status_code_ordering() {
    let mut codes = vec!["default", "404", "2XX", "200", "500", "201"];
    codes.sort_by(|a, b| compare_status_codes(a, b));
    assert_eq!(codes, vec!["200", "201", "404", "500", "2XX", "default"]);
    assert_eq!(compare_status_codes("99", "100"), Ordering::Less);
}

#[test]
fn test_alpha_suffixes() {
    assert_eq!(alpha_suffix(0), "A");
    assert_eq!(alpha_suffix(25), "Z");
    assert_eq!(alpha_suffix(26), "AA");
    assert_eq!(alpha_suffix(27), "AB");
    assert_eq!(alpha_suffix(51), "AZ");
    assert_eq!(alpha_suffix(52), "BA");
    assert_eq!(alpha_suffix(701), "ZZ");
    assert_eq!(alpha_suffix(702), "AAA");
}

#[test]
fn test_variants_cover_codes_and_content_types() {
    let doc = ApiDocument::new(json!({
        "paths": { "/a": { "get": { "responses": {
            "default": { "description": "err", "content": { "application/json": { "schema": { "type": "object" } } } },
            "200": { "description": "ok", "content": {
                "text/plain": { "schema": { "type": "string" } },
                "application/json": { "schema": { "type": "object" } },
                "application/xml": {}
            } },
            "204": { "description": "empty" }
        } } } }
    }));
    let tools = convert_document(&doc, &ConvertOptions::default()).unwrap();
    let got: Vec<_> = tools[0]
        .responses
        .iter()
        .map(|r| format!("{}:{}:{}", r.suffix, r.status_code, r.content_type))
        .collect();
    assert_eq!(
        got,
        vec![
            "A:200:application/json",
            "B:200:text/plain",
            "C:default:application/json"
        ]
    );
}

fn node_markdown(schema: Value) -> String {
    let doc = ApiDocument::new(json!({}));
    let schema = crate::schema::translate_schema(&doc, &schema, "t").unwrap();
    let full = render_response_markdown("200", "application/json", "", &schema);
    full.split("## Response Structure\n\n").nth(1).unwrap().to_string()
}

#[test]
fn test_markdown_details_and_nesting() {
    let md = node_markdown(json!({
        "type": "object",
        "description": "A page",
        "additionalProperties": true,
        "properties": {
            "items": {
                "type": "array",
                "minItems": 1,
                "uniqueItems": true,
                "items": { "type": "string", "format": "uuid", "pattern": "^`x`$" }
            },
            "status": { "type": "string", "enum": ["open", "done"], "default": "open" },
            "count": { "type": "integer", "minimum": 0, "exclusiveMaximum": 10, "nullable": true }
        }
    }));
    let expected = "\
- A page (Type: object):
  - **count** (Type: integer, nullable):
    - Minimum: 0
    - Maximum: 10
    - Exclusive Maximum: true
    - Nullable: true
  - **items** (Type: array):
    - Min Items: 1
    - Unique Items: true
    - **Items** (Type: string, uuid):
      - Pattern: '^'x'$'
  - **status** (Type: string):
    - Default: 'open'
    - Enum: ['open', 'done']
  - **Allows Additional Properties**
";
    assert_eq!(md, expected);
}

#[test]
fn test_markdown_combinators() {
    let md = node_markdown(json!({
        "oneOf": [{ "type": "string" }, { "type": "integer" }],
        "not": { "type": "boolean" }
    }));
    let expected = "\
- Structure (Type: Combinator):
  - **One Of the following structures**:
    - **Option 1** (Type: string):
    - **Option 2** (Type: integer):
  - **Not**: Cannot be the following structure:
    - **Forbidden Structure** (Type: boolean):
";
    assert_eq!(md, expected);
}

#[test]
fn test_markdown_additional_properties_schema() {
    let md = node_markdown(json!({
        "type": "object",
        "additionalProperties": { "type": "integer" }
    }));
    assert!(md.contains("  - **Additional Properties**:\n    - **property value** (Type: integer):\n"));

    let closed = node_markdown(json!({ "type": "object", "additionalProperties": false }));
    assert_eq!(closed, "- Structure (Type: object):\n");
}

#[test]
fn test_format_value_rules() {
    let string_schema = Schema {
        types: vec!["string".into()],
        ..Schema::default()
    };
    assert_eq!(format_value(&string_schema, &json!("\"quoted\"")), "quoted");
    assert_eq!(format_value(&string_schema, &json!("a`b")), "a'b");
    assert_eq!(format_value(&string_schema, &json!(5)), "5");

    let object_schema = Schema {
        types: vec!["object".into()],
        ..Schema::default()
    };
    assert_eq!(format_value(&object_schema, &json!({ "a": 1 })), "{\"a\":1}");
    assert_eq!(format_value(&object_schema, &json!("text")), "\"text\"");
}

#[test]
fn test_unknown_type_label() {
    let md = node_markdown(json!({ "description": "anything" }));
    assert_eq!(md, "- anything (Type: unknown):\n");
}
