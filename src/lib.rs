//! # Squishy IDL Compiler Library
//!
//! Squishy is a small Interface Definition Language describing binary-serializable
//! records. A schema declares named structs and exactly one exported struct; the compiler
//! validates it and emits a Luau module with type declarations plus functions that
//! write and read those records to and from a byte buffer.
//!
//! ## Core Components
//!
//! - **Lexer** (`lexer`): Tokenizes the source and classifies every token by its context.
//! - **Parser** (`parser`): Builds a [`ast::Schema`] from the tokens and runs semantic
//!   analysis (unknown types, exported struct references, self and cyclic references).
//! - **Order** (`order`): Sorts the structs that need helper functions so that
//!   dependencies come first.
//! - **Generators** (`generators`): Turn the schema into target code, Luau for now.
//!
//! ## Example
//!
//! ```rust
//! use squishy::generators::luau::LuauGenerator;
//!
//! let source = "
//!     struct Point {
//!         field x : f32
//!         field y : f32
//!     }
//!     exports Point
//! ";
//!
//! let mut generator = LuauGenerator::default();
//! let outputs = squishy::compile(source, &mut generator).unwrap();
//!
//! for (path, content) in outputs {
//!     println!("Generated file: {:?}", path);
//!     assert!(content.contains("export type Point"));
//! }
//! ```

use std::path::PathBuf;

use tracing::info;

pub mod ast;
pub mod config;
pub mod error;
pub mod generators;
pub mod lexer;
pub mod order;
pub mod parser;
pub mod source;

pub use error::{CompileError, Diagnostic};
use generators::CodeGenerator;

/// Runs the whole pipeline over `source`: scan, parse and analyze, then generate.
pub fn compile(
    source: &str,
    generator: &mut impl CodeGenerator,
) -> Result<Vec<(PathBuf, String)>, CompileError> {
    info!("tokenizing");
    let tokens = lexer::scan(source)?;
    info!("parsing");
    let schema = parser::parse(&tokens)?;
    info!("generating");
    generator.generate(&schema)
}
