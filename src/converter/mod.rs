//! Conversion of an [`ApiDocument`](crate::spec::ApiDocument) into the
//! ordered [`Tool`] model.
//!
//! Arguments come from parameters and the request body, the input schema is
//! emitted as draft-7, and every `(status, content type)` response with a
//! schema is documented as Markdown.

mod args;
mod request;
mod response;
mod tool;
mod types;

pub use args::*;
pub use request::*;
pub use response::*;
pub use tool::*;
pub use types::*;

#[cfg(test)]
mod tests;
