//! Error taxonomy for the whole pipeline and the diagnostic that reports it.
//!
//! Every stage fails fast: the first [`CompileError`] aborts the compilation. Each
//! variant maps to a stable numeric code (see [`CompileError::code`]) which the
//! command line tool uses as its exit status.

use std::{backtrace::Backtrace, fmt::Write, path::PathBuf};

use colored::Colorize;
use thiserror::Error;

use crate::lexer::Position;

/// Every way a compilation can fail.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("given name '{name}' is not in preferred format ^[a-zA-Z_][a-zA-Z0-9_]*$: {reason}")]
    InvalidNaming { name: String, reason: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("the specified path '{}' does not exist", .0.display())]
    PathDoesntExist(PathBuf),

    #[error("the specified path '{}' is a directory, not a file", .0.display())]
    PathIsADirectoryNotAFile(PathBuf),

    #[error("the file '{}' does not have any of the required extensions '{expected}'", .path.display())]
    InvalidExtension { path: PathBuf, expected: String },

    #[error("the destination directory '{}' is not valid or not a directory at all", .0.display())]
    DestinationDirectoryIsntValid(PathBuf),

    #[error("the operator '{lexeme}' at '{position}' is not recognised")]
    UnknownOperator { lexeme: String, position: Position },

    #[error("first token of a file must always be a keyword but got '{lexeme}' instead")]
    UnexpectedTokenAtStart { lexeme: String },

    #[error("the input source has not been tokenized yet")]
    NotTokenized,

    #[error("expected 1 export statement but got {found} instead")]
    Expected1Export { found: usize },

    #[error("expected at least 1 struct definition but got none")]
    ExpectedStructs,

    #[error("expected at least 1 field in the whole file but got none")]
    Expected1Field,

    #[error(
        "the struct '{export}' is exported and cannot be referenced by another struct, but it was referenced by '{}'",
        .referenced_by.join(", ")
    )]
    ExportStructCantBeReferenced {
        export: String,
        referenced_by: Vec<String>,
    },

    #[error("the type '{name}' used in struct '{used_in}' is not recognised")]
    UnknownType { name: String, used_in: String },

    #[error(
        "a struct cannot reference itself, but struct '{name}' references itself in fields '{}'",
        .fields.join(", ")
    )]
    AStructCantReferenceItself { name: String, fields: Vec<String> },

    #[error("did not find a struct named '{name}' to export")]
    DidntFoundAStructToExport { name: String },

    #[error("expected a name for the export statement at '{position}'")]
    ExpectedNameForExport { position: Position },

    #[error("unexpected token '{lexeme}' after struct definition end at '{position}'")]
    UnexpectedTokenAfterStruct { lexeme: String, position: Position },

    #[error("a struct must have at least 1 field, but struct '{name}' has none")]
    AStructMustHaveAtleast1Field { name: String },

    #[error(
        "another struct named '{name}' already exists at '{first}', found a second definition at '{second}'"
    )]
    AnotherStructWithSameNameExists {
        name: String,
        first: Position,
        second: Position,
    },

    #[error("a struct definition should start with '{{' but at '{position}' got '{found}'")]
    StructShouldStartWithCurlyBrace { position: Position, found: String },

    #[error("expected a name for the struct definition at '{position}'")]
    ExpectedNameForStruct { position: Position },

    #[error(
        "expected a field definition after field '{field}' at '{position}' in struct '{struct_name}' since the struct was not closed yet"
    )]
    ExpectedFieldAfterAnotherField {
        field: String,
        position: Position,
        struct_name: String,
    },

    #[error("another field named '{field}' already exists in struct '{struct_name}'")]
    AnotherFieldWithSameNameExists { struct_name: String, field: String },

    #[error("expected a name for the field definition at '{position}'")]
    ExpectedNameForField { position: Position },

    #[error("bracket opened at '{opened_at}' was not closed, got '{found}' at '{position}' instead of ']'")]
    BracketNotClosed {
        opened_at: Position,
        found: String,
        position: Position,
    },

    #[error("expected 'map' or 'smap' after the map value type opened at '{position}'")]
    ExpectedMapDefinition { position: Position },

    #[error("curly brace opened at '{position}' was not closed")]
    CurlyBraceNotClosed { position: Position },

    #[error("no value type was specified for the map opened at '{position}'")]
    NoTypeSpecifiedForMap { position: Position },

    #[error("expected a valid type at '{position}' but got '{lexeme}' instead")]
    ExpectedAValidType { lexeme: String, position: Position },

    #[error("the struct defined at '{position}' can not be named '{name}' since that is a built-in type")]
    InvalidStructNaming { name: String, position: Position },

    #[error("unexpected token '{lexeme}' after field definition at '{position}'")]
    UnexpectedTokenAfterField { lexeme: String, position: Position },

    #[error("cyclic reference detected, path is '{}'", .path.join(" -> "))]
    CyclicReference { path: Vec<String> },

    #[error("array size '{lexeme}' at '{position}' must be a positive integer")]
    InvalidArraySize { lexeme: String, position: Position },
}

impl CompileError {
    /// Stable code of the error kind, used as the process exit status.
    pub fn code(&self) -> i32 {
        match self {
            CompileError::InvalidNaming { .. } => 1,
            CompileError::Io(_) => 3,
            CompileError::PathDoesntExist(_) => 4,
            CompileError::PathIsADirectoryNotAFile(_) => 5,
            CompileError::InvalidExtension { .. } => 6,
            CompileError::DestinationDirectoryIsntValid(_) => 8,
            CompileError::UnknownOperator { .. } => 9,
            CompileError::UnexpectedTokenAtStart { .. } => 10,
            CompileError::NotTokenized => 11,
            CompileError::Expected1Export { .. } => 12,
            CompileError::ExpectedStructs => 13,
            CompileError::Expected1Field => 14,
            CompileError::ExportStructCantBeReferenced { .. } => 15,
            CompileError::UnknownType { .. } => 16,
            CompileError::AStructCantReferenceItself { .. } => 17,
            CompileError::DidntFoundAStructToExport { .. } => 18,
            CompileError::ExpectedNameForExport { .. } => 19,
            CompileError::UnexpectedTokenAfterStruct { .. } => 20,
            CompileError::AStructMustHaveAtleast1Field { .. } => 21,
            CompileError::AnotherStructWithSameNameExists { .. } => 22,
            CompileError::StructShouldStartWithCurlyBrace { .. } => 23,
            CompileError::ExpectedNameForStruct { .. } => 24,
            CompileError::ExpectedFieldAfterAnotherField { .. } => 25,
            CompileError::AnotherFieldWithSameNameExists { .. } => 26,
            CompileError::ExpectedNameForField { .. } => 27,
            CompileError::BracketNotClosed { .. } => 28,
            CompileError::ExpectedMapDefinition { .. } => 29,
            CompileError::CurlyBraceNotClosed { .. } => 30,
            CompileError::NoTypeSpecifiedForMap { .. } => 31,
            CompileError::ExpectedAValidType { .. } => 32,
            CompileError::InvalidStructNaming { .. } => 33,
            CompileError::UnexpectedTokenAfterField { .. } => 34,
            CompileError::CyclicReference { .. } => 35,
            CompileError::InvalidArraySize { .. } => 36,
        }
    }
}

/// A user facing report holding one or more error messages and the call path that
/// produced the first of them.
#[derive(Debug)]
#[must_use]
pub struct Diagnostic {
    errors: Vec<CompileError>,
    trace: Backtrace,
}

impl Diagnostic {
    /// Starts a report from the error that aborted the compilation.
    pub fn report(error: CompileError) -> Self {
        Diagnostic {
            errors: vec![error],
            trace: Backtrace::force_capture(),
        }
    }

    /// Appends another message to the report.
    pub fn add(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// Exit status for the process, taken from the first error.
    pub fn exit_code(&self) -> i32 {
        self.errors.first().map_or(1, CompileError::code)
    }

    /// Renders every message on its own line. Messages are numbered when there is
    /// more than one; `debug` appends the captured call path.
    pub fn render(&self, debug: bool) -> String {
        let mut out = String::new();
        let numbered = self.errors.len() > 1;

        for (index, error) in self.errors.iter().enumerate() {
            if numbered {
                let _ = write!(out, "{}: ", index.to_string().bold());
            }
            let _ = writeln!(out, "{} {error}", "[ERROR]".red());
        }

        if debug {
            let _ = writeln!(out, "\n{}", "[STACK]".blue());
            let _ = writeln!(out, "{}", self.trace);
        }

        out
    }
}

impl From<CompileError> for Diagnostic {
    fn from(error: CompileError) -> Self {
        Diagnostic::report(error)
    }
}
