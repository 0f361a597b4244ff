use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

use super::merge::{MergeEngine, MergeOutcome};
use super::naming::{module_name, unique_module_name};
use super::syntax::HandlerShape;
use super::templates::{
    default_handler_body, default_imports, render_cargo_toml, render_lib_rs, render_server,
    render_tool, render_tools_mod,
};
use crate::converter::{convert_document, ConvertOptions, Tool};
use crate::error::{GenError, Result, ToolFailure};
use crate::spec::ApiDocument;

/// Knobs for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Root of the generated crate.
    pub output: PathBuf,
    /// Crate name; the document title slug when unset.
    pub package: Option<String>,
    /// Module under `src/` that holds the tool files.
    pub tools_module: String,
    /// Overrides the document's first server URL.
    pub server_url: Option<String>,
    /// Request type of the handler signature.
    pub request_type: String,
    /// Success type of the handler signature.
    pub result_type: String,
    /// Fail a tool instead of regenerating when its file does not parse.
    pub strict_merge: bool,
    /// Render and merge without touching the disk.
    pub dry_run: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            output: PathBuf::from("."),
            package: None,
            tools_module: "tools".to_string(),
            server_url: None,
            request_type: "CallToolRequest".to_string(),
            result_type: "CallToolResult".to_string(),
            strict_merge: false,
            dry_run: false,
        }
    }
}

/// What happened (or would happen) to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Created,
    Updated,
    Unchanged,
    /// Developer-owned file that already exists.
    Kept,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileAction::Created => "created",
            FileAction::Updated => "updated",
            FileAction::Unchanged => "unchanged",
            FileAction::Kept => "kept",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub action: FileAction,
    /// Set for merge-managed tool files.
    pub merge: Option<MergeOutcome>,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub files: Vec<FileReport>,
    pub tools: usize,
}

impl GenerationReport {
    /// Tool files whose prior content could not be parsed and was replaced.
    pub fn degraded(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.merge, Some(MergeOutcome::Degraded { .. })))
    }

    /// Files that were (or would be) written.
    pub fn changed(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.action, FileAction::Created | FileAction::Updated))
    }
}

/// Create `path` (and parents) unless it already is a directory.
///
/// # Errors
///
/// [`GenError::NotADirectory`] when something other than a directory is in
/// the way, [`GenError::Io`] for any other failure.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(GenError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path).map_err(|e| GenError::io(path, e))
        }
        Err(e) => Err(GenError::io(path, e)),
    }
}

fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(GenError::io(path, e)),
    }
}

/// Prior content of a tool file. Bytes that are not UTF-8 come back as the
/// decoder's message so the merge can treat the file as unparsable.
fn read_prior(path: &Path) -> Result<Option<std::result::Result<String, String>>> {
    Ok(read_bytes(path)?.map(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string())))
}

/// Write `content` to `path` only when it differs from what is there.
///
/// The write goes through a temporary file in the same directory that is
/// then renamed over the target.
pub fn write_if_changed(path: &Path, content: &str, dry_run: bool) -> Result<FileAction> {
    let action = match read_bytes(path)? {
        Some(existing) if existing == content.as_bytes() => return Ok(FileAction::Unchanged),
        Some(_) => FileAction::Updated,
        None => FileAction::Created,
    };
    if dry_run {
        return Ok(action);
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| GenError::io(parent, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| GenError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| GenError::io(path, e.error))?;
    Ok(action)
}

fn write_if_missing(path: &Path, content: &str, dry_run: bool) -> Result<FileAction> {
    if path.exists() {
        return Ok(FileAction::Kept);
    }
    write_if_changed(path, content, dry_run)
}

/// Compile `doc` into tools and reconcile them with the crate at
/// `options.output`.
///
/// Translation errors abort before anything is written. Merge and write
/// failures are collected per tool; the other tools and the shared files
/// are still written and the run ends with [`GenError::ToolFailures`].
#[instrument(skip(doc, options), fields(output = %options.output.display()))]
pub fn generate_project(doc: &ApiDocument, options: &GenerateOptions) -> Result<GenerationReport> {
    let tools = convert_document(
        doc,
        &ConvertOptions {
            server_url: options.server_url.clone(),
        },
    )?;
    let package = options.package.clone().unwrap_or_else(|| doc.slug());

    let src_dir = options.output.join("src");
    let tools_dir = src_dir.join(&options.tools_module);
    if !options.dry_run {
        ensure_output_dir(&options.output)?;
        ensure_output_dir(&src_dir)?;
        ensure_output_dir(&tools_dir)?;
    }

    let engine = MergeEngine::rust(options.strict_merge);
    let default_body = default_handler_body()?;
    let imports = default_imports(&options.request_type);

    let mut report = GenerationReport {
        tools: tools.len(),
        ..GenerationReport::default()
    };
    let mut failures = Vec::new();
    let mut modules = Vec::new();
    let mut seen = HashSet::new();

    for tool in &tools {
        let module = unique_module_name(&mut seen, &module_name(&tool.name));
        let path = tools_dir.join(format!("{module}.rs"));
        match generate_tool(tool, &module, &path, &engine, &imports, &default_body, options) {
            Ok(file) => {
                modules.push(module);
                report.files.push(file);
            }
            Err(error) => {
                warn!(tool = %tool.name, error = %error, "tool not regenerated");
                println!("⚠️  Failed to generate {}: {error}", tool.name);
                if path.exists() {
                    modules.push(module);
                }
                failures.push(ToolFailure {
                    tool: tool.name.clone(),
                    error,
                });
            }
        }
    }

    let shared = [
        (
            tools_dir.join("mod.rs"),
            render_tools_mod(&modules, &options.request_type)?,
        ),
        (
            src_dir.join("server.rs"),
            render_server(
                &options.tools_module,
                &package,
                doc.version().unwrap_or("0.1.0"),
            )?,
        ),
    ];
    for (path, content) in shared {
        let action = write_if_changed(&path, &content, options.dry_run)?;
        print_action(&path, action, options.dry_run);
        report.files.push(FileReport {
            path,
            action,
            merge: None,
        });
    }

    let owned = [
        (
            options.output.join("Cargo.toml"),
            render_cargo_toml(&package)?,
        ),
        (
            src_dir.join("lib.rs"),
            render_lib_rs(doc.title().unwrap_or(&package), &options.tools_module)?,
        ),
    ];
    for (path, content) in owned {
        let action = write_if_missing(&path, &content, options.dry_run)?;
        print_action(&path, action, options.dry_run);
        report.files.push(FileReport {
            path,
            action,
            merge: None,
        });
    }

    info!(
        tools = report.tools,
        changed = report.changed().count(),
        failed = failures.len(),
        "generation finished"
    );
    if failures.is_empty() {
        Ok(report)
    } else {
        Err(GenError::ToolFailures { failures })
    }
}

fn generate_tool(
    tool: &Tool,
    module: &str,
    path: &Path,
    engine: &MergeEngine,
    default_imports: &str,
    default_body: &str,
    options: &GenerateOptions,
) -> Result<FileReport> {
    let handler = format!("{module}_handler");
    let shape = HandlerShape::tool_handler(&handler, &options.request_type, &options.result_type);
    let plan = match read_prior(path)? {
        Some(Err(message)) => engine.unreadable(path, message, default_imports, default_body)?,
        prior => engine.plan(
            path,
            prior.as_ref().and_then(|p| p.as_deref().ok()),
            &tool.name,
            &shape,
            default_imports,
            default_body,
        )?,
    };
    if let MergeOutcome::Degraded { reason } = &plan.outcome {
        println!("⚠️  {path:?} did not parse ({reason}); handler edits were discarded");
    }
    let content = render_tool(
        tool,
        &handler,
        &options.request_type,
        &options.result_type,
        &plan,
    )?;
    let action = write_if_changed(path, &content, options.dry_run)?;
    print_action(path, action, options.dry_run);
    Ok(FileReport {
        path: path.to_path_buf(),
        action,
        merge: Some(plan.outcome),
    })
}

fn print_action(path: &Path, action: FileAction, dry_run: bool) {
    match action {
        FileAction::Created | FileAction::Updated if dry_run => {
            println!("📝 Would write {path:?} ({action})")
        }
        FileAction::Created => println!("✅ Generated {path:?}"),
        FileAction::Updated => println!("✅ Updated {path:?}"),
        FileAction::Unchanged => println!("ℹ️  Unchanged: {path:?}"),
        FileAction::Kept => println!("ℹ️  Keeping existing {path:?}"),
    }
}
