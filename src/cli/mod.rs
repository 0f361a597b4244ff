//! # CLI Module
//!
//! Command-line front end of the `toolforge-gen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Compile an OpenAPI document into a tool crate, keeping any handler bodies
//! and imports already written in it:
//!
//! ```bash
//! toolforge-gen generate --spec openapi.yaml --output todo-tools
//! ```
//!
//! Options:
//! - `--spec <FILE>` - OpenAPI document, YAML or JSON (required)
//! - `--output <DIR>` - Root of the generated crate (required)
//! - `--package <NAME>` - Crate name (default: slug of `info.title`)
//! - `--config <FILE>` - `toolforge.toml` (default: next to the document)
//! - `--validate` - Check the document against the OpenAPI model first
//! - `--strict-merge` - Fail a tool whose existing file does not parse
//! - `--dry-run` - Report what would change without writing
//!
//! ### `inspect`
//!
//! Print the tools a document compiles to, or one tool in full:
//!
//! ```bash
//! toolforge-gen inspect --spec openapi.yaml
//! toolforge-gen inspect --spec openapi.yaml --tool get_todo
//! ```
//!
//! `inspect` reads `toolforge.toml` the same way `generate` does (`--config`,
//! or next to the document), so a configured `server_url` is reflected.

mod commands;


pub use commands::{run_cli, Cli, Commands};
