mod document;
mod load;

pub use document::*;
pub use load::*;
