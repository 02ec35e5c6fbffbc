use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::lexer::Position;

/// Represents the built-in types supported by Squishy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    /// Half precision float.
    F16,
    /// 24-bit float.
    F24,
    F32,
    F64,
    /// Two f32 components.
    Vector2,
    /// Three f32 components.
    Vector3,
    Vector2Int16,
    Vector3Int16,
    /// Unit vector packed into 2 bytes.
    Vector2Norm,
    /// Unit vector packed into 4 bytes.
    Vector3Norm,
    /// Position plus full rotation matrix.
    CFrame,
    /// Position plus euler angles.
    CFrameEuler,
    /// Position plus quaternion.
    CFrameQuat,
    /// Three u8 channels.
    Color3,
    /// Three f16 channels.
    Color3Hdr,
    /// u8 length prefix.
    String,
    /// u16 length prefix.
    StringLong,
    /// One byte on its own, one bit inside arrays.
    Bool,
}

impl Builtin {
    pub const ALL: [Builtin; 24] = [
        Builtin::U8,
        Builtin::I8,
        Builtin::U16,
        Builtin::I16,
        Builtin::U32,
        Builtin::I32,
        Builtin::F16,
        Builtin::F24,
        Builtin::F32,
        Builtin::F64,
        Builtin::Vector2,
        Builtin::Vector3,
        Builtin::Vector2Int16,
        Builtin::Vector3Int16,
        Builtin::Vector2Norm,
        Builtin::Vector3Norm,
        Builtin::CFrame,
        Builtin::CFrameEuler,
        Builtin::CFrameQuat,
        Builtin::Color3,
        Builtin::Color3Hdr,
        Builtin::String,
        Builtin::StringLong,
        Builtin::Bool,
    ];

    /// Looks up a built-in by its schema spelling.
    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// The spelling used in schemas and in the runtime codec names.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::U8 => "u8",
            Builtin::I8 => "i8",
            Builtin::U16 => "u16",
            Builtin::I16 => "i16",
            Builtin::U32 => "u32",
            Builtin::I32 => "i32",
            Builtin::F16 => "f16",
            Builtin::F24 => "f24",
            Builtin::F32 => "f32",
            Builtin::F64 => "f64",
            Builtin::Vector2 => "vector2",
            Builtin::Vector3 => "vector3",
            Builtin::Vector2Int16 => "vector2int16",
            Builtin::Vector3Int16 => "vector3int16",
            Builtin::Vector2Norm => "vector2norm",
            Builtin::Vector3Norm => "vector3norm",
            Builtin::CFrame => "cframe",
            Builtin::CFrameEuler => "cframe_e",
            Builtin::CFrameQuat => "cframe_q",
            Builtin::Color3 => "color3",
            Builtin::Color3Hdr => "color3_hdr",
            Builtin::String => "string",
            Builtin::StringLong => "string_l",
            Builtin::Bool => "bool",
        }
    }
}

/// What a field's values are made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Builtin(Builtin),
    /// Another struct of the schema, by name.
    Struct(String),
}

impl ElementType {
    /// Resolves a type name: anything that is not a built-in refers to a struct.
    pub fn resolve(name: &str) -> Self {
        match Builtin::from_name(name) {
            Some(builtin) => ElementType::Builtin(builtin),
            None => ElementType::Struct(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ElementType::Builtin(builtin) => builtin.name(),
            ElementType::Struct(name) => name,
        }
    }
}

/// How the elements of a field are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    Scalar,
    /// `size` is `None` for a length prefixed array.
    Array { size: Option<usize> },
    /// `short` selects the narrower key count prefix.
    Map { short: bool },
}

/// The type of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub element: ElementType,
    pub shape: TypeShape,
}

impl TypeRef {
    pub fn scalar(name: &str) -> Self {
        TypeRef {
            element: ElementType::resolve(name),
            shape: TypeShape::Scalar,
        }
    }

    pub fn name(&self) -> &str {
        self.element.name()
    }

    pub fn is_array(&self) -> bool {
        matches!(self.shape, TypeShape::Array { .. })
    }

    /// Fixed element count, or -1 for a dynamic array (and for non-arrays). Counts
    /// beyond `i64::MAX` saturate.
    pub fn array_size(&self) -> i64 {
        match self.shape {
            TypeShape::Array { size: Some(size) } => i64::try_from(size).unwrap_or(i64::MAX),
            _ => -1,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self.shape, TypeShape::Map { .. })
    }

    pub fn is_short_map(&self) -> bool {
        matches!(self.shape, TypeShape::Map { short: true })
    }

    pub fn is_struct_reference(&self) -> bool {
        matches!(self.element, ElementType::Struct(_))
    }

    /// Name of the referenced struct, if the elements are structs.
    pub fn struct_name(&self) -> Option<&str> {
        match &self.element {
            ElementType::Struct(name) => Some(name),
            ElementType::Builtin(_) => None,
        }
    }
}

/// Represents a field within a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_ref: TypeRef,
}

/// Represents a struct definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub name: String,
    /// Where the `struct` keyword opening this definition sits.
    pub position: Position,
    pub fields: Vec<Field>,
    /// For every referenced struct, the indices of the fields referencing it.
    pub other_struct_references: IndexMap<String, BTreeSet<usize>>,
    /// Set once all structs are parsed.
    pub ever_referenced: bool,
    /// How many references each other struct makes to this one.
    pub referenced_by: IndexMap<String, usize>,
}

impl Struct {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Struct {
            name: name.into(),
            position,
            fields: Vec::new(),
            other_struct_references: IndexMap::new(),
            ever_referenced: false,
            referenced_by: IndexMap::new(),
        }
    }

    /// Appends a field, recording it as a reference when its type names a struct.
    pub fn push_field(&mut self, field: Field) {
        if let Some(target) = field.type_ref.struct_name() {
            self.other_struct_references
                .entry(target.to_string())
                .or_default()
                .insert(self.fields.len());
        }
        self.fields.push(field);
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Names of the fields that reference `target`.
    pub fn fields_referencing(&self, target: &str) -> Vec<String> {
        self.other_struct_references
            .get(target)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.fields.get(index))
            .map(|field| format!("{}:{}", field.name, field.type_ref.name()))
            .collect()
    }
}

/// A parsed and validated schema.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Structs by name, in source order.
    pub structs: IndexMap<String, Struct>,
    /// Name of the exported struct.
    pub exports: String,
}

impl Schema {
    pub fn export_struct(&self) -> Option<&Struct> {
        self.structs.get(&self.exports)
    }
}
