use std::path::PathBuf;

use crate::{ast::Schema, error::CompileError};

pub mod luau;

/// A trait for code generators that translate a validated [`Schema`] into target
/// language code.
pub trait CodeGenerator {
    /// Translates the schema into generated source files.
    ///
    /// Returns a vector of (file name, content) tuples. File names are relative; the
    /// caller decides which directory they are written to.
    fn generate(&mut self, schema: &Schema) -> Result<Vec<(PathBuf, String)>, CompileError>;
}
