//! Luau type declarations for schema structs.

use tracing::debug;

use crate::ast::{Builtin, ElementType, Schema, Struct, TypeRef, TypeShape};

/// The Luau type a built-in decodes to.
pub fn host_type(builtin: Builtin) -> &'static str {
    match builtin {
        Builtin::U8
        | Builtin::I8
        | Builtin::U16
        | Builtin::I16
        | Builtin::U32
        | Builtin::I32
        | Builtin::F16
        | Builtin::F24
        | Builtin::F32
        | Builtin::F64 => "number",
        Builtin::Vector2 | Builtin::Vector2Norm => "Vector2",
        Builtin::Vector3 | Builtin::Vector3Norm => "Vector3",
        Builtin::Vector2Int16 => "Vector2int16",
        Builtin::Vector3Int16 => "Vector3int16",
        Builtin::CFrame | Builtin::CFrameEuler | Builtin::CFrameQuat => "CFrame",
        Builtin::Color3 | Builtin::Color3Hdr => "Color3",
        Builtin::String | Builtin::StringLong => "string",
        Builtin::Bool => "boolean",
    }
}

fn element_type(element: &ElementType) -> &str {
    match element {
        ElementType::Builtin(builtin) => host_type(*builtin),
        ElementType::Struct(name) => name,
    }
}

/// Renders the Luau type of one field.
pub fn render_type(type_ref: &TypeRef) -> String {
    let element = element_type(&type_ref.element);
    match type_ref.shape {
        TypeShape::Scalar => element.to_string(),
        TypeShape::Array { .. } => format!("{{ [number] : {element} }}"),
        TypeShape::Map { .. } => format!("{{ [string] : {element} }}"),
    }
}

fn render_declaration(keyword: &str, s: &Struct, indent: &str) -> String {
    let mut out = format!("{keyword} {} = {{\n", s.name);
    for field in &s.fields {
        out.push_str(&format!("{indent}{} : {};", field.name, render_type(&field.type_ref)));
        if let TypeShape::Array { size: Some(size) } = field.type_ref.shape {
            out.push_str(&format!(" -- {size} elements"));
        }
        out.push('\n');
    }
    out.push('}');
    out
}

/// One `type` declaration per struct of `order`, separated by blank lines.
pub fn render_types(order: &[String], schema: &Schema, indent: &str) -> String {
    let types = order
        .iter()
        .filter_map(|name| schema.structs.get(name))
        .map(|s| render_declaration("type", s, indent))
        .collect::<Vec<_>>()
        .join("\n\n");
    debug!("types:\n{types}");
    types
}

/// The exported declaration of the export struct, empty if the schema has none.
pub fn render_export(schema: &Schema, indent: &str) -> String {
    schema
        .export_struct()
        .map(|s| render_declaration("export type", s, indent))
        .unwrap_or_default()
}
