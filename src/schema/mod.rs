//! Schema translation and draft-7 emission.
//!
//! [`translate_schema`] normalises one OpenAPI schema node (3.0 or 3.1
//! dialect) into a [`Schema`]; [`emit_schema`] and [`emit_input_schema`]
//! project those values into draft-7 JSON Schema.

mod draft7;
mod translate;
mod types;

pub use draft7::*;
pub use translate::*;
pub use types::*;
