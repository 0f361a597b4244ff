use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{load_config, resolve_config_path};
use crate::converter::{convert_document, ConvertOptions, Tool};
use crate::generator::{generate_project, GenerateOptions, GenerationReport};
use crate::logging::{init_logging_with_config, LogConfig};
use crate::spec::{load_document, validate_document};

/// Command-line interface for toolforge
#[derive(Parser, Debug)]
#[command(name = "toolforge-gen")]
#[command(about = "Generate MCP tool scaffolding from OpenAPI documents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Debug logging with source locations
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate or regenerate a tool crate from an OpenAPI document
    Generate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Root directory of the generated crate
        #[arg(short, long)]
        output: PathBuf,

        /// Crate name; derived from `info.title` when omitted
        #[arg(long)]
        package: Option<String>,

        /// Path to toolforge.toml
        /// If not provided, will auto-detect alongside the document
        #[arg(long)]
        config: Option<PathBuf>,

        /// Validate the document against the OpenAPI model before generating
        #[arg(long, default_value_t = false)]
        validate: bool,

        /// Fail a tool whose existing file cannot be parsed instead of regenerating it
        #[arg(long, default_value_t = false)]
        strict_merge: bool,

        /// Show what would change without writing files
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// List the tools a document compiles to
    Inspect {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Print the input schema and response docs of one tool
        #[arg(short, long)]
        tool: Option<String>,

        /// Path to toolforge.toml
        /// If not provided, will auto-detect alongside the document
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Execute a parsed command line
///
/// # Errors
///
/// Returns an error if:
/// - The document or config cannot be loaded or parsed
/// - Validation was requested and fails
/// - Translation fails, or any tool fails to merge or write
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::from_env()
    };
    if let Err(e) = init_logging_with_config(&log_config) {
        eprintln!("Warning: {e:#}");
    }

    match cli.command {
        Commands::Generate {
            spec,
            output,
            package,
            config,
            validate,
            strict_merge,
            dry_run,
        } => {
            let doc = load_document(&spec)?;
            if validate {
                validate_document(&doc)?;
                println!("✅ {spec:?} is a valid OpenAPI document");
            }

            let mut options = GenerateOptions {
                output,
                package,
                strict_merge,
                dry_run,
                ..GenerateOptions::default()
            };
            apply_config_file(config.as_deref(), &spec, &mut options)?;

            let report = generate_project(&doc, &options)
                .with_context(|| format!("Failed to generate tools from {}", spec.display()))?;
            print_summary(&report, dry_run);
            Ok(())
        }
        Commands::Inspect { spec, tool, config } => {
            let doc = load_document(&spec)?;
            let mut options = GenerateOptions::default();
            apply_config_file(config.as_deref(), &spec, &mut options)?;
            let tools = convert_document(
                &doc,
                &ConvertOptions {
                    server_url: options.server_url,
                },
            )?;
            match tool {
                Some(name) => {
                    let Some(found) = tools.iter().find(|t| t.name == name) else {
                        bail!("No tool named '{name}' in {}", spec.display());
                    };
                    print_tool_detail(found);
                }
                None => print_tool_list(&tools),
            }
            Ok(())
        }
    }
}

/// Merge `toolforge.toml` (explicit, or found next to `spec`) into `options`.
///
/// A missing file is only an error when its path was given explicitly.
pub(crate) fn apply_config_file(
    explicit: Option<&Path>,
    spec: &Path,
    options: &mut GenerateOptions,
) -> anyhow::Result<()> {
    let Some(config_path) = resolve_config_path(explicit, spec) else {
        return Ok(());
    };
    match load_config(&config_path)? {
        Some(file_config) => {
            println!("📄 Using config {config_path:?}");
            file_config.apply_to(options);
        }
        None if explicit.is_some() => {
            bail!("Config file not found: {}", config_path.display())
        }
        None => {}
    }
    Ok(())
}

fn print_summary(report: &GenerationReport, dry_run: bool) {
    let changed = report.changed().count();
    if dry_run {
        println!("ℹ️  Dry run: {changed} file(s) would change for {} tool(s)", report.tools);
    } else {
        println!("✅ {} tool(s), {changed} file(s) written", report.tools);
    }
    for file in report.degraded() {
        println!(
            "⚠️  {:?} could not be parsed and was regenerated; handler edits in it were lost",
            file.path
        );
    }
}

fn print_tool_list(tools: &[Tool]) {
    for tool in tools {
        println!("{} ({} {})", tool.name, tool.request.method, tool.request.url);
        for arg in &tool.args {
            let required = if arg.required { ", required" } else { "" };
            println!("  - {} [{}{required}]", arg.name, arg.source);
        }
        for variant in &tool.responses {
            println!(
                "  → {}: {} {}",
                variant.suffix, variant.status_code, variant.content_type
            );
        }
    }
}

fn print_tool_detail(tool: &Tool) {
    println!("# {}\n", tool.name);
    if !tool.description.is_empty() {
        println!("{}\n", tool.description);
    }
    println!("{} {}", tool.request.method, tool.request.url);
    for header in &tool.request.headers {
        println!("{}: {}", header.key, header.value);
    }
    println!("\n## Input schema\n\n{}\n", tool.input_schema);
    for variant in &tool.responses {
        println!("## Response {}\n\n{}", variant.suffix, variant.body);
    }
}
