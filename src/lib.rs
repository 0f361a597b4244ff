//! # toolforge
//!
//! **toolforge** compiles an [OpenAPI](https://spec.openapis.org/oas/v3.1.0) document into
//! MCP tool scaffolding: one Rust module per operation, each carrying a draft-7 input schema,
//! Markdown documentation for every response shape and a handler function for the developer
//! to fill in. Regeneration is safe. Handler bodies and imports written by hand are carried
//! over verbatim while everything derived from the document is brought up to date.
//!
//! ## Architecture
//!
//! - **[`spec`]** - Loading the document and walking its operations, parameters and `$ref`s
//! - **[`schema`]** - Normalised [`schema::Schema`] model, translation from OpenAPI and draft-7 emission
//! - **[`converter`]** - Arguments, request templates and response docs assembled into [`converter::Tool`]s
//! - **[`generator`]** - Rendering, the handler-preserving merge engine and file writing
//! - **[`config`]** - Optional `toolforge.toml`
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `toolforge-gen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(toolforge-gen)
//!     participant Spec as spec::load_document
//!     participant Conv as converter::convert_document
//!     participant Merge as generator::MergeEngine
//!     participant FS as File System
//!
//!     User->>CLI: generate --spec openapi.yaml --output todo-tools
//!     CLI->>Spec: load_document("openapi.yaml")
//!     Spec-->>CLI: ApiDocument
//!     CLI->>Conv: convert_document(&doc)
//!     Conv->>Conv: translate schemas, extract args,<br/>emit draft-7, document responses
//!     Conv-->>CLI: Vec<Tool> (sorted by name)
//!     loop every tool
//!         CLI->>FS: read src/tools/<module>.rs
//!         CLI->>Merge: plan(prior, handler shape)
//!         Merge-->>CLI: imports + handler body
//!         CLI->>FS: write if changed
//!     end
//!     CLI->>FS: tools/mod.rs, server.rs, Cargo.toml, lib.rs
//!     CLI-->>User: ✅ summary
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! toolforge-gen generate --spec openapi.yaml --output todo-tools
//! # edit todo-tools/src/tools/get_todo.rs, then regenerate at will
//! toolforge-gen generate --spec openapi.yaml --output todo-tools
//! ```
//!
//! ```rust,no_run
//! use std::path::Path;
//! use toolforge::generator::{generate_project, GenerateOptions};
//! use toolforge::spec::load_document;
//!
//! # fn main() -> anyhow::Result<()> {
//! let doc = load_document(Path::new("openapi.yaml"))?;
//! let report = generate_project(
//!     &doc,
//!     &GenerateOptions {
//!         output: "todo-tools".into(),
//!         ..GenerateOptions::default()
//!     },
//! )?;
//! println!("{} tools", report.tools);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod generator;
pub mod logging;
pub mod schema;
pub mod spec;

pub use error::{GenError, Result};
