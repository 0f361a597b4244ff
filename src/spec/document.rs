use serde_json::Value;

use crate::error::{GenError, Result};

/// HTTP methods an OpenAPI path item may carry, in the order operations are
/// visited.
pub const METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Upper bound on `$ref` hops before a chain is treated as a cycle.
const MAX_REF_DEPTH: usize = 32;

/// In-memory OpenAPI document.
///
/// The document is kept as a JSON tree so that 3.0 and 3.1 keywords (and
/// vendor extensions) survive untouched; typed access happens through the
/// accessors below.
#[derive(Debug, Clone)]
pub struct ApiDocument {
    root: Value,
}

/// One `(path, method)` pair of the document.
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    /// Path template, e.g. `/todos/{id}`.
    pub path: &'a str,
    /// Lower-case HTTP method.
    pub method: &'static str,
    /// The operation object (already `$ref`-resolved).
    pub operation: &'a Value,
    /// The owning path item, for path-level parameters.
    pub path_item: &'a Value,
}

impl<'a> OperationRef<'a> {
    pub fn operation_id(&self) -> Option<&'a str> {
        self.operation
            .get("operationId")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn summary(&self) -> Option<&'a str> {
        non_empty_str(self.operation, "summary")
    }

    pub fn description(&self) -> Option<&'a str> {
        non_empty_str(self.operation, "description")
    }

    pub fn request_body(&self) -> Option<&'a Value> {
        self.operation.get("requestBody")
    }

    pub fn responses(&self) -> Option<&'a serde_json::Map<String, Value>> {
        self.operation.get("responses").and_then(Value::as_object)
    }
}

impl ApiDocument {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// `info.title`, if declared.
    pub fn title(&self) -> Option<&str> {
        self.root.pointer("/info/title").and_then(Value::as_str)
    }

    /// `info.version`, if declared.
    pub fn version(&self) -> Option<&str> {
        self.root.pointer("/info/version").and_then(Value::as_str)
    }

    /// Lower-case, underscore separated form of the title, used as the default
    /// package name.
    pub fn slug(&self) -> String {
        self.title()
            .unwrap_or("api")
            .to_lowercase()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
            .trim_matches('_')
            .to_string()
    }

    /// URL of the first declared server.
    pub fn server_url(&self) -> Option<&str> {
        self.root
            .get("servers")
            .and_then(Value::as_array)
            .and_then(|servers| servers.first())
            .and_then(|server| server.get("url"))
            .and_then(Value::as_str)
    }

    /// All operations, by path then by [`METHODS`] order.
    pub fn operations(&self) -> Result<Vec<OperationRef<'_>>> {
        let Some(paths) = self.root.get("paths").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };
        let mut ops = Vec::new();
        for (path, item) in paths {
            let item = self.resolve(item)?;
            for method in METHODS {
                if let Some(operation) = item.get(method) {
                    ops.push(OperationRef {
                        path,
                        method,
                        operation: self.resolve(operation)?,
                        path_item: item,
                    });
                }
            }
        }
        Ok(ops)
    }

    /// Parameters that apply to `op`: path-level ones first, overridden by
    /// operation-level ones sharing the same `(name, in)` pair.
    pub fn parameters<'a>(&'a self, op: &OperationRef<'a>) -> Result<Vec<&'a Value>> {
        let mut merged: Vec<&'a Value> = Vec::new();
        for source in [op.path_item, op.operation] {
            let Some(list) = source.get("parameters").and_then(Value::as_array) else {
                continue;
            };
            for param in list {
                let param = self.resolve(param)?;
                let key = parameter_key(param);
                if let Some(slot) = merged.iter_mut().find(|p| parameter_key(p) == key) {
                    *slot = param;
                } else {
                    merged.push(param);
                }
            }
        }
        Ok(merged)
    }

    /// Look up a local JSON pointer reference such as
    /// `#/components/schemas/Todo`.
    pub fn lookup(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix('#')?;
        if pointer.is_empty() {
            return Some(&self.root);
        }
        self.root.pointer(pointer)
    }

    /// Follow a `$ref` chain until a concrete node is reached.
    ///
    /// # Errors
    ///
    /// [`GenError::UnresolvedRef`] if a hop points nowhere, and
    /// [`GenError::CyclicRef`] if the chain does not terminate.
    pub fn resolve<'a>(&'a self, node: &'a Value) -> Result<&'a Value> {
        let mut current = node;
        for _ in 0..MAX_REF_DEPTH {
            match reference_of(current) {
                Some(reference) => {
                    current = self.lookup(reference).ok_or_else(|| GenError::UnresolvedRef {
                        reference: reference.to_string(),
                    })?;
                }
                None => return Ok(current),
            }
        }
        Err(GenError::CyclicRef {
            reference: reference_of(current).unwrap_or_default().to_string(),
        })
    }
}

/// The `$ref` string carried by `node`, if any.
pub fn reference_of(node: &Value) -> Option<&str> {
    node.get("$ref").and_then(Value::as_str)
}

fn parameter_key(param: &Value) -> (Option<&str>, Option<&str>) {
    (
        param.get("name").and_then(Value::as_str),
        param.get("in").and_then(Value::as_str),
    )
}

fn non_empty_str<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}
