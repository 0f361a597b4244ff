#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use toolforge::generator::{
    generate_project, FileAction, GenerateOptions, MergeOutcome, RustSyntax, SourceSyntax,
};
use toolforge::spec::{parse_document, ApiDocument};
use toolforge::GenError;

const SPEC: &str = r#"
openapi: 3.0.3
info:
  title: Todo API
  version: 1.0.0
servers:
  - url: https://api.example.com
paths:
  /todos:
    get:
      operationId: listTodos
      summary: List todos
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
            minimum: 1
      responses:
        "200":
          description: All todos
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Todo'
  /todos/{id}:
    get:
      operationId: getTodo
      summary: Get a todo
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        "200":
          description: The todo
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Todo'
        "404":
          description: Not found
components:
  schemas:
    Todo:
      type: object
      required: [id]
      properties:
        id:
          type: string
        done:
          type: boolean
"#;

const CUSTOM_BODY: &str = r#"{
    // fetch it for real
    let id = request.argument("id").cloned().unwrap_or_default();
    let _ = ctx;
    Ok(CallToolResult::text(fetch(id)))
}"#;

fn doc(source: &str) -> ApiDocument {
    parse_document(source, false).unwrap()
}

fn options(out: &Path) -> GenerateOptions {
    GenerateOptions {
        output: out.to_path_buf(),
        ..GenerateOptions::default()
    }
}

fn tool_path(out: &Path, module: &str) -> PathBuf {
    out.join("src/tools").join(format!("{module}.rs"))
}

fn snapshot(out: &Path) -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    let mut stack = vec![out.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let content = fs::read_to_string(&path).unwrap();
                files.push((path, content));
            }
        }
    }
    files.sort();
    files
}

/// Swap the generated handler body for `body`.
fn edit_handler(path: &Path, body: &str, extra_import: &str) {
    let content = fs::read_to_string(path).unwrap();
    let start = content.find("Result<CallToolResult, Error> {").unwrap()
        + "Result<CallToolResult, Error> ".len();
    let edited = format!("{}{body}\n", &content[..start]);
    let edited = edited.replacen("use serde_json::Value;", &format!("{extra_import}\nuse serde_json::Value;"), 1);
    fs::write(path, edited).unwrap();
}

#[test]
fn test_generates_expected_layout() {
    let dir = TempDir::new().unwrap();
    let report = generate_project(&doc(SPEC), &options(dir.path())).unwrap();
    assert_eq!(report.tools, 2);

    for path in [
        "Cargo.toml",
        "src/lib.rs",
        "src/server.rs",
        "src/tools/mod.rs",
        "src/tools/get_todo.rs",
        "src/tools/list_todos.rs",
    ] {
        assert!(dir.path().join(path).is_file(), "missing {path}");
    }

    let tools_mod = fs::read_to_string(dir.path().join("src/tools/mod.rs")).unwrap();
    assert!(tools_mod.find("pub mod get_todo;").unwrap() < tools_mod.find("pub mod list_todos;").unwrap());

    let get_todo = fs::read_to_string(tool_path(dir.path(), "get_todo")).unwrap();
    assert!(get_todo.contains("pub const REQUEST_URL: &str = \"https://api.example.com/todos/{id}\";"));
    assert!(get_todo.contains("pub const RESPONSE_TEMPLATE_A"));
    assert!(!get_todo.contains("RESPONSE_TEMPLATE_B"), "404 has no schema");
    assert!(get_todo.contains("pub async fn get_todo_handler("));

    let cargo = fs::read_to_string(dir.path().join("Cargo.toml")).unwrap();
    assert!(cargo.contains("name = \"todo_api\""));
}

#[test]
fn test_regeneration_is_idempotent() {
    let dir = TempDir::new().unwrap();
    generate_project(&doc(SPEC), &options(dir.path())).unwrap();
    let first = snapshot(dir.path());

    let report = generate_project(&doc(SPEC), &options(dir.path())).unwrap();
    assert_eq!(report.changed().count(), 0);
    assert!(report
        .files
        .iter()
        .all(|f| matches!(f.action, FileAction::Unchanged | FileAction::Kept)));
    assert_eq!(snapshot(dir.path()), first);
}

#[test]
fn test_handler_edits_survive_regeneration() {
    let dir = TempDir::new().unwrap();
    generate_project(&doc(SPEC), &options(dir.path())).unwrap();
    let path = tool_path(dir.path(), "get_todo");
    edit_handler(&path, CUSTOM_BODY, "use crate::backend::fetch as fetch;");

    let changed = SPEC.replace("summary: Get a todo", "summary: Fetch one todo");
    let report = generate_project(&doc(&changed), &options(dir.path())).unwrap();
    let merged = report.files.iter().find(|f| f.path == path).unwrap();
    assert_eq!(merged.merge, Some(MergeOutcome::Merged));
    assert_eq!(merged.action, FileAction::Updated);

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("pub const DESCRIPTION: &str = \"Fetch one todo\";"));
    assert!(content.contains("use crate::backend::fetch as fetch;\nuse serde_json::Value;"));
    assert!(content.ends_with(&format!("Result<CallToolResult, Error> {CUSTOM_BODY}\n")));

    // and a further run is a no-op
    let again = generate_project(&doc(&changed), &options(dir.path())).unwrap();
    assert_eq!(again.changed().count(), 0);
}

#[test]
fn test_ambiguous_handler_fails_only_that_tool() {
    let dir = TempDir::new().unwrap();
    generate_project(&doc(SPEC), &options(dir.path())).unwrap();

    let path = tool_path(dir.path(), "get_todo");
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str(
        "\nmod again {\n    pub async fn get_todo_handler(ctx: RequestContext, request: CallToolRequest) -> Result<CallToolResult, Error> { todo!() }\n}\n",
    );
    fs::write(&path, &content).unwrap();
    fs::remove_file(tool_path(dir.path(), "list_todos")).unwrap();

    let err = generate_project(&doc(SPEC), &options(dir.path())).unwrap_err();
    match err {
        GenError::ToolFailures { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].tool, "getTodo");
            assert!(matches!(
                failures[0].error,
                GenError::AmbiguousHandler { count: 2, .. }
            ));
        }
        other => panic!("expected ToolFailures, got {other}"),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
    assert!(tool_path(dir.path(), "list_todos").is_file());
}

#[test]
fn test_unparsable_file_degrades_unless_strict() {
    let dir = TempDir::new().unwrap();
    generate_project(&doc(SPEC), &options(dir.path())).unwrap();
    let pristine = fs::read_to_string(tool_path(dir.path(), "get_todo")).unwrap();
    let path = tool_path(dir.path(), "get_todo");

    fs::write(&path, "pub async fn get_todo_handler(").unwrap();
    let strict = GenerateOptions {
        strict_merge: true,
        ..options(dir.path())
    };
    let err = generate_project(&doc(SPEC), &strict).unwrap_err();
    assert!(err.to_string().contains("cannot parse existing file"), "{err}");
    assert_eq!(fs::read_to_string(&path).unwrap(), "pub async fn get_todo_handler(");

    let report = generate_project(&doc(SPEC), &options(dir.path())).unwrap();
    assert_eq!(report.degraded().count(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), pristine);
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("crate");
    let dry = GenerateOptions {
        dry_run: true,
        ..options(&out)
    };
    let report = generate_project(&doc(SPEC), &dry).unwrap();
    assert_eq!(report.changed().count(), 6);
    assert!(!out.exists());
}

#[test]
fn test_developer_owned_files_are_kept() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"mine\"\n").unwrap();
    generate_project(&doc(SPEC), &options(dir.path())).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("Cargo.toml")).unwrap(),
        "[package]\nname = \"mine\"\n"
    );
}

#[test]
fn test_output_path_that_is_a_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("taken");
    fs::write(&file, "").unwrap();
    let err = generate_project(&doc(SPEC), &options(&file)).unwrap_err();
    assert!(matches!(err, GenError::NotADirectory { .. }));
}

#[test]
fn test_translation_error_writes_nothing() {
    let broken = SPEC.replace(
        "            type: string\n      responses:",
        "            oneOf:\n              - type: string\n              - $ref: '#/components/schemas/Missing'\n      responses:",
    );
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("crate");
    let err = generate_project(&doc(&broken), &options(&out)).unwrap_err();
    assert!(matches!(err, GenError::DanglingCombinator { index: 1, .. }), "{err}");
    assert!(!out.exists());
}

#[test]
fn test_colliding_module_names_get_suffixes() {
    let spec = r#"
openapi: 3.0.3
info: { title: Dup, version: "1" }
paths:
  /a:
    get:
      operationId: fetchItem
      responses: {}
  /b:
    get:
      operationId: fetch_item
      responses: {}
"#;
    let dir = TempDir::new().unwrap();
    generate_project(&doc(spec), &options(dir.path())).unwrap();
    assert!(tool_path(dir.path(), "fetch_item").is_file());
    let second = fs::read_to_string(tool_path(dir.path(), "fetch_item_1")).unwrap();
    assert!(second.contains("pub async fn fetch_item_1_handler("));
}

#[test]
fn test_carriage_returns_in_descriptions_still_parse() {
    let spec = r#"{
  "openapi": "3.0.3",
  "info": { "title": "Carriage\rReturn", "version": "1" },
  "paths": {
    "/todos": {
      "get": {
        "operationId": "listTodos",
        "description": "line1\rline2\r\nline3",
        "responses": {
          "200": {
            "description": "ok\rmore",
            "content": {
              "application/json": { "schema": { "type": "string", "description": "a\rb" } }
            }
          }
        }
      }
    }
  }
}"#;
    let dir = TempDir::new().unwrap();
    generate_project(&doc(spec), &options(dir.path())).unwrap();
    let path = tool_path(dir.path(), "list_todos");
    let generated = fs::read_to_string(&path).unwrap();
    assert!(!generated.contains('\r'));
    RustSyntax.parse(&generated).unwrap();
    assert!(generated.contains("//! line1\n//! line2\n//! line3\n"));
    RustSyntax
        .parse(&fs::read_to_string(dir.path().join("src/lib.rs")).unwrap())
        .unwrap();

    edit_handler(&path, CUSTOM_BODY, "use crate::backend::fetch;");
    let report = generate_project(&doc(spec), &options(dir.path())).unwrap();
    assert_eq!(report.degraded().count(), 0);
    let merged = report.files.iter().find(|f| f.path == path).unwrap();
    assert_eq!(merged.merge, Some(MergeOutcome::Merged));
    assert!(fs::read_to_string(&path).unwrap().contains(CUSTOM_BODY));
}

#[test]
fn test_colliding_tool_added_later_does_not_take_over_handler() {
    let before = r#"
openapi: 3.0.3
info: { title: Dup, version: "1" }
paths:
  /b:
    get:
      operationId: get_todo
      responses: {}
"#;
    let after = format!("{before}  /a:\n    get:\n      operationId: getTodo\n      responses: {{}}\n");
    let dir = TempDir::new().unwrap();
    generate_project(&doc(before), &options(dir.path())).unwrap();
    let path = tool_path(dir.path(), "get_todo");
    edit_handler(&path, CUSTOM_BODY, "use crate::backend::fetch;");
    let edited = fs::read_to_string(&path).unwrap();

    let err = generate_project(&doc(&after), &options(dir.path())).unwrap_err();
    match err {
        GenError::ToolFailures { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].tool, "getTodo");
            match &failures[0].error {
                GenError::ForeignFile { expected, found, .. } => {
                    assert_eq!(expected, "getTodo");
                    assert_eq!(found, "get_todo");
                }
                other => panic!("expected ForeignFile, got {other}"),
            }
        }
        other => panic!("expected ToolFailures, got {other}"),
    }
    // the edited file still belongs to get_todo, untouched
    assert_eq!(fs::read_to_string(&path).unwrap(), edited);
    let moved = fs::read_to_string(tool_path(dir.path(), "get_todo_1")).unwrap();
    assert!(moved.contains("pub const NAME: &str = \"get_todo\";"));
    assert!(!moved.contains(CUSTOM_BODY));
}

#[test]
fn test_non_utf8_tool_file_degrades_unless_strict() {
    let dir = TempDir::new().unwrap();
    generate_project(&doc(SPEC), &options(dir.path())).unwrap();
    let path = tool_path(dir.path(), "get_todo");
    let pristine = fs::read_to_string(&path).unwrap();
    let garbage = [0xff_u8, 0xfe, b'f', b'n'];
    fs::write(&path, garbage).unwrap();

    let strict = GenerateOptions {
        strict_merge: true,
        ..options(dir.path())
    };
    let err = generate_project(&doc(SPEC), &strict).unwrap_err();
    match err {
        GenError::ToolFailures { failures } => {
            assert!(matches!(failures[0].error, GenError::UnparsablePrior { .. }));
        }
        other => panic!("expected ToolFailures, got {other}"),
    }
    assert_eq!(fs::read(&path).unwrap(), garbage);

    let report = generate_project(&doc(SPEC), &options(dir.path())).unwrap();
    assert_eq!(report.degraded().count(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), pristine);
}
