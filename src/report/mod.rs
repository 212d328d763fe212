//! Authenticity report value type and its pure assembler.

mod assemble;
mod types;


pub use assemble::{ReportInput, assemble};
pub use types::{AuthenticityReport, META_EXTRACTOR, META_MOCK, META_POLICY};
