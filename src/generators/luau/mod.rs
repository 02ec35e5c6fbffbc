//! Luau output: type declarations plus buffer marshalling functions, assembled into
//! a fixed module template.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::{
    ast::Schema,
    config::OUTPUT_EXTENSION,
    error::CompileError,
    generators::CodeGenerator,
    order::order,
};

pub mod marshal;
pub mod types;

const TEMPLATE: &str = include_str!("template.luau");

/// A replaceable marker on a fixed line of [`TEMPLATE`].
#[derive(Debug, Clone, Copy)]
struct Slot {
    line: usize,
    marker: &'static str,
}

const FILE: Slot = Slot { line: 3, marker: "@slot(file)" };
const AUTHOR: Slot = Slot { line: 4, marker: "@slot(author)" };
const DATE: Slot = Slot { line: 5, marker: "@slot(date)" };
const BRIEF: Slot = Slot { line: 6, marker: "@slot(brief)" };
const WRITER_REQUIRE: Slot = Slot { line: 13, marker: "@slot(writer_require)" };
const READER_REQUIRE: Slot = Slot { line: 14, marker: "@slot(reader_require)" };
const TYPES: Slot = Slot { line: 20, marker: "-- @slot(types)" };
const WRITERS: Slot = Slot { line: 22, marker: "-- @slot(writers)" };
const READERS: Slot = Slot { line: 24, marker: "-- @slot(readers)" };
const EXPORT_TYPE: Slot = Slot { line: 26, marker: "-- @slot(export_type)" };
const WRITE_SIGNATURE: Slot = Slot { line: 28, marker: "-- @slot(write_signature)" };
const WRITE_BODY: Slot = Slot { line: 31, marker: "-- @slot(write_body)" };
const READ_SIGNATURE: Slot = Slot { line: 37, marker: "-- @slot(read_signature)" };
const READ_BODY: Slot = Slot { line: 39, marker: "-- @slot(read_body)" };
const READ_RETURN: Slot = Slot { line: 40, marker: "-- @slot(read_return)" };

/// Configuration settings specific to Luau code generation
#[derive(Debug, Clone)]
pub struct LuauConfig {
    /// Number of spaces to use for each indentation level.
    pub indent_spaces: u8,
    /// Column the fields of the returned record are aligned to in `scheme.read`.
    pub return_indent: usize,
    /// Written into the file header.
    pub author: String,
    /// Luau expression of the instance holding the `writer` and `reader` runtime modules.
    pub runtime_path: String,
}

impl Default for LuauConfig {
    fn default() -> Self {
        LuauConfig {
            indent_spaces: 4,
            return_indent: 12,
            author: "squishy-compiler".to_string(),
            runtime_path: "script.Parent".to_string(),
        }
    }
}

pub struct LuauGenerator {
    /// The configuration settings for the generated Luau code.
    config: LuauConfig,
    /// Directory the output is meant for, shown in the header.
    output_dir: PathBuf,
    /// Shown in the header.
    generated_at: DateTime<Local>,
}

impl Default for LuauGenerator {
    fn default() -> Self {
        LuauGenerator::new(None)
    }
}

impl LuauGenerator {
    /// Creates a new `LuauGenerator` instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Optional configuration; uses default if None is provided.
    pub fn new(config: Option<LuauConfig>) -> Self {
        LuauGenerator {
            config: config.unwrap_or_default(),
            output_dir: PathBuf::from("."),
            generated_at: Local::now(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Fixes the header date, for reproducible output.
    pub fn with_timestamp(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn config(&self) -> &LuauConfig {
        &self.config
    }

    /// Name of the file generated for `schema`.
    pub fn file_name(schema: &Schema) -> PathBuf {
        PathBuf::from(format!("{}.{OUTPUT_EXTENSION}", schema.exports))
    }

    fn indent(&self) -> String {
        " ".repeat(self.config.indent_spaces as usize)
    }

    /// Renders the complete module for `schema`.
    pub fn render(&self, schema: &Schema) -> Result<String, CompileError> {
        let export = schema
            .export_struct()
            .ok_or_else(|| CompileError::DidntFoundAStructToExport {
                name: schema.exports.clone(),
            })?;
        let indent = self.indent();
        let order = order(schema);
        let body = marshal::render_body(export);

        let file = self.output_dir.join(Self::file_name(schema));
        let writer_require = format!("{}.writer", self.config.runtime_path);
        let reader_require = format!("{}.reader", self.config.runtime_path);
        let date = self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let brief = format!("encodes and decodes {} to and from a buffer", export.name);
        let write_signature = format!("function scheme.write(input : {}) : buffer", export.name);
        let read_signature = format!("function scheme.read(buff : buffer) : {}", export.name);
        let read_return = format!(
            "{indent}return {}",
            multiline_record(&body.read_return, self.config.return_indent)
        );

        let mut lines: Vec<String> = TEMPLATE.lines().map(String::from).collect();
        let mut fill = |slot: Slot, content: &str| {
            lines[slot.line] = lines[slot.line].replace(slot.marker, content);
        };

        fill(FILE, &file.display().to_string());
        fill(AUTHOR, &self.config.author);
        fill(DATE, &date);
        fill(BRIEF, &brief);
        fill(WRITER_REQUIRE, &writer_require);
        fill(READER_REQUIRE, &reader_require);
        fill(TYPES, &types::render_types(&order, schema, &indent));
        fill(WRITERS, &marshal::render_writers(&order, schema, &indent).join("\n"));
        fill(READERS, &marshal::render_readers(&order, schema, &indent).join("\n"));
        fill(EXPORT_TYPE, &types::render_export(schema, &indent));
        fill(WRITE_SIGNATURE, &write_signature);
        fill(WRITE_BODY, &indented(&body.write, &indent));
        fill(READ_SIGNATURE, &read_signature);
        fill(READ_BODY, &indented(&body.read, &indent));
        fill(READ_RETURN, &read_return);

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}

impl CodeGenerator for LuauGenerator {
    fn generate(&mut self, schema: &Schema) -> Result<Vec<(PathBuf, String)>, CompileError> {
        let content = self.render(schema)?;
        let path = Self::file_name(schema);
        debug!("generated '{}' ({} bytes)", path.display(), content.len());
        Ok(vec![(path, content)])
    }
}

fn indented(lines: &[String], indent: &str) -> String {
    lines
        .iter()
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits `{ a = a; b = b; }` so every entry after the first starts on its own line.
fn multiline_record(record: &str, indent: usize) -> String {
    let inner = record.trim().trim_start_matches('{').trim_end_matches('}');
    let entries: Vec<&str> = inner
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();
    format!("{{ {}; }}", entries.join(&format!(";\n{}", " ".repeat(indent))))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{lexer::scan, parser::parse};

    const SLOTS: [Slot; 15] = [
        FILE,
        AUTHOR,
        DATE,
        BRIEF,
        WRITER_REQUIRE,
        READER_REQUIRE,
        TYPES,
        WRITERS,
        READERS,
        EXPORT_TYPE,
        WRITE_SIGNATURE,
        WRITE_BODY,
        READ_SIGNATURE,
        READ_BODY,
        READ_RETURN,
    ];

    fn schema(source: &str) -> Schema {
        parse(&scan(source).unwrap()).unwrap()
    }

    fn generator() -> LuauGenerator {
        let at = Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        LuauGenerator::default()
            .with_output_dir("out")
            .with_timestamp(at)
    }

    #[test]
    fn test_slot_markers_sit_on_their_lines() {
        let lines: Vec<&str> = TEMPLATE.lines().collect();
        for slot in SLOTS {
            assert!(
                lines[slot.line].contains(slot.marker),
                "line {} should hold {}",
                slot.line,
                slot.marker
            );
        }
        assert_eq!(TEMPLATE.matches("@slot(").count(), SLOTS.len());
    }

    #[test]
    fn test_multiline_record() {
        assert_eq!(multiline_record("{ x = x; }", 12), "{ x = x; }");
        assert_eq!(
            multiline_record("{ x = x; y = y; }", 4),
            "{ x = x;\n    y = y; }"
        );
    }

    #[test]
    fn test_single_struct_module() {
        let schema = schema("struct Point { field x : f32 field y : f32 } exports Point");
        let out = generator().render(&schema).unwrap();

        assert!(!out.contains("@slot("));
        assert!(out.contains("* @file     : out/Point.luau"));
        assert!(out.contains("* @date     : 2025-03-14 09:26:53"));
        assert!(out.contains("local writer = require(script.Parent.writer)"));
        assert!(out.contains("export type Point = {\n    x : number;\n    y : number;\n}"));
        assert!(!out.contains("local function"));
        assert!(out.contains(
            "function scheme.write(input : Point) : buffer\n    \
             local buff = sharedBuffer\n    \
             local cursor = 0\n    \
             cursor = writer.write_f32(buff, cursor, input.x)\n    \
             cursor = writer.write_f32(buff, cursor, input.y)\n"
        ));
        assert!(out.contains(
            "function scheme.read(buff : buffer) : Point\n    \
             local cursor = 0\n    \
             local x, y\n    \
             cursor, x = reader.read_f32(buff, cursor)\n    \
             cursor, y = reader.read_f32(buff, cursor)\n    \
             return { x = x;\n            y = y; }\n\
             end\n"
        ));
        assert!(out.ends_with("return scheme\n"));
    }

    #[test]
    fn test_helpers_precede_entry_points() {
        let schema = schema("struct Inner { field v u8 } struct Outer { field i Inner } exports Outer");
        let out = generator().render(&schema).unwrap();

        let helper = out.find("local function write_Inner").unwrap();
        let reader = out.find("local function read_Inner").unwrap();
        let entry = out.find("function scheme.write").unwrap();
        assert!(helper < reader && reader < entry);
        assert!(out.contains("type Inner = {\n    v : number;\n}"));
        assert!(out.contains("    cursor = write_Inner(buff, cursor, input.i)"));
        assert!(out.contains("    cursor, i = read_Inner(buff, cursor)"));
    }

    #[test]
    fn test_config_is_applied() {
        let config = LuauConfig {
            indent_spaces: 2,
            return_indent: 4,
            author: "tests".to_string(),
            runtime_path: "game.ReplicatedStorage.Squishy".to_string(),
        };
        let schema = schema("struct P { field a u8 field b u8 } exports P");
        let out = LuauGenerator::new(Some(config)).render(&schema).unwrap();

        assert!(out.contains("* @author   : tests"));
        assert!(out.contains("require(game.ReplicatedStorage.Squishy.reader)"));
        assert!(out.contains("  return { a = a;\n    b = b; }"));
    }

    #[test]
    fn test_generate_names_file_after_export() {
        let schema = schema("struct Packet { field id u16 } exports Packet");
        let files = generator().generate(&schema).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, PathBuf::from("Packet.luau"));
    }

    #[test]
    fn test_missing_export_struct() {
        let schema = Schema {
            exports: "Ghost".to_string(),
            ..Schema::default()
        };
        assert!(matches!(
            generator().render(&schema),
            Err(CompileError::DidntFoundAStructToExport { name }) if name == "Ghost"
        ));
    }
}
