//! # Generator Module
//!
//! Turns the tool list produced by [`crate::converter`] into a Rust crate and
//! keeps that crate in sync with the API document across regenerations.
//!
//! ## Generated Structure
//!
//! ```text
//! todo-tools/
//! ├── Cargo.toml              # written once, then developer-owned
//! └── src/
//!     ├── lib.rs              # written once, then developer-owned
//!     ├── server.rs           # router setup, rewritten every run
//!     └── tools/
//!         ├── mod.rs          # module list and all_tools(), rewritten every run
//!         └── *.rs            # one merge-managed file per tool
//! ```
//!
//! ## Regeneration
//!
//! Tool files are reconciled by the [`MergeEngine`]: the file's imports and
//! the body of its `<module>_handler` function are carried over byte for
//! byte, everything else (constants, schema, docs, `tool()`) is rendered
//! again from the document. Running the generator twice with the same
//! document leaves every file untouched.
//!
//! The engine works on a language-neutral [`ParsedSource`]; [`RustSyntax`]
//! fills it in with `syn`.
//!
//! ## Templates
//!
//! Askama templates live in `templates/`:
//!
//! - `tool.rs.txt` - one tool module
//! - `handler_body.rs.txt` - default handler body
//! - `tools_mod.rs.txt` - tool registry module
//! - `server.rs.txt` - router constructor
//! - `Cargo.toml.txt`, `lib.rs.txt` - crate skeleton

mod merge;
mod naming;
mod project;
mod syntax;
mod templates;

pub use merge::*;
pub use naming::*;
pub use project::*;
pub use syntax::*;
pub use templates::*;
