//! Buffer writer and reader synthesis.
//!
//! Every generated step threads an integer cursor through one buffer: writes take
//! the cursor and a value and return the advanced cursor, reads take the cursor and
//! return the advanced cursor plus the value.

use std::collections::HashSet;

use tracing::debug;

use crate::ast::{Builtin, ElementType, Field, Schema, Struct, TypeShape};

/// Names the generated code owns. A field local with one of these names is renamed.
const RESERVED_LOCALS: [&str; 7] = [
    "cursor",
    "buff",
    "input",
    "reader",
    "writer",
    "sharedBuffer",
    "scheme",
];

/// The generated statements of one struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    /// One write statement per field, in declaration order.
    pub write: Vec<String>,
    /// A `local` declaration of every field followed by one read per field.
    pub read: Vec<String>,
    /// Table constructor building the record from the read locals.
    pub read_return: String,
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Write,
    Read,
}

impl Op {
    fn verb(self) -> &'static str {
        match self {
            Op::Write => "write",
            Op::Read => "read",
        }
    }

    fn runtime(self) -> &'static str {
        match self {
            Op::Write => "writer",
            Op::Read => "reader",
        }
    }

    /// Function that encodes or decodes a single element.
    fn element_function(self, element: &ElementType) -> String {
        match element {
            ElementType::Builtin(builtin) => {
                format!("{}.{}_{}", self.runtime(), self.verb(), builtin.name())
            }
            ElementType::Struct(name) => format!("{}_{name}", self.verb()),
        }
    }

    /// Function call and its arguments after `buff, cursor`, for one field.
    fn call(self, field: &Field) -> (String, Vec<String>) {
        let type_ref = &field.type_ref;
        let runtime = self.runtime();
        let verb = self.verb();
        let is_bool = type_ref.element == ElementType::Builtin(Builtin::Bool);

        match type_ref.shape {
            TypeShape::Scalar => (self.element_function(&type_ref.element), Vec::new()),
            TypeShape::Array { size: Some(size) } if is_bool => {
                (format!("{runtime}.{verb}_boolArray"), vec![size.to_string()])
            }
            TypeShape::Array { size: None } if is_bool => {
                (format!("{runtime}.{verb}_dynamicBoolArray"), Vec::new())
            }
            TypeShape::Array { size: Some(size) } => (
                format!("{runtime}.{verb}_array"),
                vec![self.element_function(&type_ref.element), size.to_string()],
            ),
            TypeShape::Array { size: None } => (
                format!("{runtime}.{verb}_dynamicArray"),
                vec![self.element_function(&type_ref.element)],
            ),
            TypeShape::Map { short } => (
                format!("{runtime}.{verb}_{}map", if short { "s" } else { "" }),
                vec![self.element_function(&type_ref.element)],
            ),
        }
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_LOCALS.contains(&name) || name.starts_with("read_") || name.starts_with("write_")
}

/// Local variables holding the fields of `s` while its record is being read, one per
/// field. A reserved field name becomes `field_<name>`, with `_` appended until it
/// differs from every field name and every other local.
fn locals(s: &Struct) -> Vec<String> {
    let taken: HashSet<&str> = s.fields.iter().map(|field| field.name.as_str()).collect();
    let mut renamed = Vec::new();

    s.fields
        .iter()
        .map(|field| {
            if !is_reserved(&field.name) {
                return field.name.clone();
            }
            let mut local = format!("field_{}", field.name);
            while taken.contains(local.as_str()) || renamed.contains(&local) {
                local.push('_');
            }
            renamed.push(local.clone());
            local
        })
        .collect()
}

fn write_statement(field: &Field) -> String {
    let (function, extra) = Op::Write.call(field);
    let mut args = vec!["buff".to_string(), "cursor".to_string(), format!("input.{}", field.name)];
    args.extend(extra);
    format!("cursor = {function}({})", args.join(", "))
}

fn read_statement(field: &Field, local: &str) -> String {
    let (function, extra) = Op::Read.call(field);
    let mut args = vec!["buff".to_string(), "cursor".to_string()];
    args.extend(extra);
    format!("cursor, {local} = {function}({})", args.join(", "))
}

/// Generates the write statements, read statements, and record constructor of `s`.
pub fn render_body(s: &Struct) -> Body {
    let write = s.fields.iter().map(write_statement).collect();

    let locals = locals(s);
    let mut read = vec![format!("local {}", locals.join(", "))];
    read.extend(
        s.fields
            .iter()
            .zip(&locals)
            .map(|(field, local)| read_statement(field, local)),
    );

    let entries: Vec<String> = s
        .fields
        .iter()
        .zip(&locals)
        .map(|(field, local)| format!("{} = {local};", field.name))
        .collect();
    let read_return = format!("{{ {} }}", entries.join(" "));

    Body {
        write,
        read,
        read_return,
    }
}

/// One `write_<Name>` function per struct of `order`.
pub fn render_writers(order: &[String], schema: &Schema, indent: &str) -> Vec<String> {
    order
        .iter()
        .filter_map(|name| schema.structs.get(name))
        .map(|s| {
            let body = render_body(s);
            let function = format!(
                "local function write_{name}(buff : buffer, cursor : number, input : {name}) : number\n\
                 {indent}{}\n\
                 {indent}return cursor\n\
                 end\n",
                body.write.join(&format!("\n{indent}")),
                name = s.name,
            );
            debug!("writer for '{}':\n{function}", s.name);
            function
        })
        .collect()
}

/// One `read_<Name>` function per struct of `order`.
pub fn render_readers(order: &[String], schema: &Schema, indent: &str) -> Vec<String> {
    order
        .iter()
        .filter_map(|name| schema.structs.get(name))
        .map(|s| {
            let body = render_body(s);
            let function = format!(
                "local function read_{name}(buff : buffer, cursor : number) : (number, {name})\n\
                 {indent}{}\n\
                 {indent}return cursor, {}\n\
                 end\n",
                body.read.join(&format!("\n{indent}")),
                body.read_return,
                name = s.name,
            );
            debug!("reader for '{}':\n{function}", s.name);
            function
        })
        .collect()
}
