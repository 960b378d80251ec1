//! # Spec Module
//!
//! Discovers OpenAPI 3 documents in an input directory and parses the subset
//! the generator needs: servers, `info.version`, operations with their
//! security requirements and parameters, and `components.securitySchemes`.
//!
//! Both JSON and YAML are accepted. Paths and methods keep the order they
//! have in the document.

mod load;
mod types;

pub use load::*;
pub use types::*;
