//! Reconciles freshly rendered tool scaffolding with a prior file on disk.
//!
//! A tool file is either *fresh* (nothing at its path) or *existing*. For an
//! existing file the engine looks for exactly one function with the tool's
//! [`HandlerShape`] and, if found, carries its body and the file's import
//! list over into the new scaffolding byte for byte.
//!
//! A file whose owner constant names a different tool is never merged: the
//! handler in it was written for that other tool.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use super::syntax::{join_imports, HandlerShape, RustSyntax, SourceSyntax};
use crate::error::{GenError, Result};

/// How the handler body and imports of a tool file were decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No usable prior handler; defaults were rendered.
    Fresh,
    /// A prior handler body and import list were carried over.
    Merged,
    /// The prior file could not be parsed and was replaced with defaults.
    Degraded { reason: String },
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::Fresh => f.write_str("fresh"),
            MergeOutcome::Merged => f.write_str("merged"),
            MergeOutcome::Degraded { reason } => write!(f, "degraded ({reason})"),
        }
    }
}

/// Import block and handler body to render into the scaffolding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub imports: String,
    pub handler_body: String,
    pub outcome: MergeOutcome,
}

impl MergePlan {
    fn defaults(imports: &str, body: &str, outcome: MergeOutcome) -> Self {
        MergePlan {
            imports: imports.to_string(),
            handler_body: body.to_string(),
            outcome,
        }
    }
}

/// Decides, per tool file, what to splice into the fresh scaffolding.
#[derive(Debug, Clone)]
pub struct MergeEngine<S = RustSyntax> {
    syntax: S,
    strict: bool,
    owner_constant: Option<String>,
}

impl MergeEngine<RustSyntax> {
    /// Engine for generated Rust tool modules, owned through `pub const NAME`.
    pub fn rust(strict: bool) -> Self {
        MergeEngine::new(RustSyntax, strict).with_owner_constant("NAME")
    }
}

impl<S: SourceSyntax> MergeEngine<S> {
    /// `strict` turns an unparsable prior file into an error instead of a
    /// degraded merge.
    pub fn new(syntax: S, strict: bool) -> Self {
        MergeEngine {
            syntax,
            strict,
            owner_constant: None,
        }
    }

    /// Check the string constant `name` of every prior file against the
    /// owner passed to [`MergeEngine::plan`].
    pub fn with_owner_constant(mut self, name: impl Into<String>) -> Self {
        self.owner_constant = Some(name.into());
        self
    }

    /// Plan for a prior file that exists but cannot be read as source text.
    ///
    /// # Errors
    ///
    /// [`GenError::UnparsablePrior`] in strict mode.
    pub fn unreadable(
        &self,
        path: &Path,
        message: String,
        default_imports: &str,
        default_body: &str,
    ) -> Result<MergePlan> {
        if self.strict {
            return Err(GenError::UnparsablePrior {
                path: path.to_path_buf(),
                message,
            });
        }
        warn!(
            path = %path.display(),
            error = %message,
            "existing tool file does not parse; regenerating from defaults"
        );
        Ok(MergePlan::defaults(
            default_imports,
            default_body,
            MergeOutcome::Degraded { reason: message },
        ))
    }

    /// Plan the merge for the file at `path`.
    ///
    /// `prior` is the current file content, if any, and `owner` the tool the
    /// file is generated for. `default_imports` and `default_body` are used
    /// whenever nothing can be carried over.
    ///
    /// # Errors
    ///
    /// [`GenError::AmbiguousHandler`] when more than one function has the
    /// handler shape, [`GenError::ForeignFile`] when the prior file belongs
    /// to another tool, and [`GenError::UnparsablePrior`] for a broken prior
    /// file in strict mode.
    pub fn plan(
        &self,
        path: &Path,
        prior: Option<&str>,
        owner: &str,
        shape: &HandlerShape,
        default_imports: &str,
        default_body: &str,
    ) -> Result<MergePlan> {
        let Some(prior) = prior else {
            return Ok(MergePlan::defaults(
                default_imports,
                default_body,
                MergeOutcome::Fresh,
            ));
        };

        let parsed = match self.syntax.parse(prior) {
            Ok(parsed) => parsed,
            Err(message) => {
                return self.unreadable(path, message, default_imports, default_body);
            }
        };

        if let Some(found) = self
            .owner_constant
            .as_deref()
            .and_then(|constant| parsed.string_constant(constant))
        {
            if found != owner {
                return Err(GenError::ForeignFile {
                    path: path.to_path_buf(),
                    expected: owner.to_string(),
                    found: found.to_string(),
                });
            }
        }

        let candidates: Vec<_> = parsed
            .functions
            .iter()
            .filter(|f| shape.matches(f))
            .collect();
        let handler = match candidates.as_slice() {
            [] => {
                debug!(path = %path.display(), handler = %shape.name, "no handler to carry over");
                return Ok(MergePlan::defaults(
                    default_imports,
                    default_body,
                    MergeOutcome::Fresh,
                ));
            }
            [one] => *one,
            many => {
                return Err(GenError::AmbiguousHandler {
                    handler: shape.name.clone(),
                    path: path.to_path_buf(),
                    count: many.len(),
                });
            }
        };

        let body = handler
            .body
            .clone()
            .and_then(|span| prior.get(span))
            .unwrap_or(default_body);
        let imports = if parsed.imports.is_empty() {
            default_imports.to_string()
        } else {
            join_imports(prior, &parsed.imports)
        };
        debug!(path = %path.display(), handler = %shape.name, "carrying over handler body");
        Ok(MergePlan {
            imports,
            handler_body: body.to_string(),
            outcome: MergeOutcome::Merged,
        })
    }
}
