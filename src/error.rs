//! Error types shared by the translation, merge and write stages.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Combinator keyword that owns a failing branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatorKind {
    OneOf,
    AnyOf,
    AllOf,
    Not,
}

impl CombinatorKind {
    /// The OpenAPI / JSON Schema keyword for this combinator.
    pub fn keyword(self) -> &'static str {
        match self {
            CombinatorKind::OneOf => "oneOf",
            CombinatorKind::AnyOf => "anyOf",
            CombinatorKind::AllOf => "allOf",
            CombinatorKind::Not => "not",
        }
    }
}

impl fmt::Display for CombinatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One tool that failed to merge or write, kept so the remaining tools can
/// still be generated.
#[derive(Debug)]
pub struct ToolFailure {
    /// Tool name as it appears in the document.
    pub tool: String,
    /// What went wrong for that tool.
    pub error: GenError,
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tool, self.error)
    }
}

/// Errors raised while compiling a document into tools or reconciling the
/// generated files with what is already on disk.
#[derive(Debug, Error)]
pub enum GenError {
    /// A combinator branch is missing or resolves to nothing.
    #[error("{kind} branch {index} at {location} does not resolve to a schema")]
    DanglingCombinator {
        kind: CombinatorKind,
        index: usize,
        location: String,
    },

    /// A `$ref` that does not point inside the document.
    #[error("unresolved reference {reference}")]
    UnresolvedRef { reference: String },

    /// A `$ref` chain that loops back on itself.
    #[error("cyclic reference {reference}")]
    CyclicRef { reference: String },

    /// More than one function in a prior file matches the handler shape.
    #[error("{count} functions named `{handler}` with the handler signature found in {path:?}")]
    AmbiguousHandler {
        handler: String,
        path: PathBuf,
        count: usize,
    },

    /// The prior file at a tool's path was generated for a different tool.
    #[error("{path:?} belongs to tool `{found}`, not `{expected}`; move it aside so its handler is not attached to the wrong operation")]
    ForeignFile {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// The prior file could not be parsed and strict merging is enabled.
    #[error("cannot parse existing file {path:?}: {message}")]
    UnparsablePrior { path: PathBuf, message: String },

    /// An output location exists but is a regular file.
    #[error("{path:?} exists and is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {template}: {source}")]
    Render {
        template: &'static str,
        #[source]
        source: askama::Error,
    },

    #[error("failed to serialise {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// Per-tool failures collected over a whole run.
    #[error("{} tool(s) failed:\n{}", .failures.len(), render_failures(.failures))]
    ToolFailures { failures: Vec<ToolFailure> },
}

impl GenError {
    /// Wrap an I/O error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

fn render_failures(failures: &[ToolFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  - {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result alias for the library stages.
pub type Result<T, E = GenError> = std::result::Result<T, E>;
