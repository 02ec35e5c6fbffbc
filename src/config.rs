//! Compiler-wide constants.

/// Version of the compiler, shown by `--version` and in logs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extensions accepted for schema source files, compared case-insensitively.
pub const SOURCE_EXTENSIONS: [&str; 2] = ["squishy", "sqy"];

/// Extension of the generated module.
pub const OUTPUT_EXTENSION: &str = "luau";
