use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ast::{Builtin, ElementType, Field, Schema, Struct, TypeRef, TypeShape},
    error::CompileError,
    lexer::{Cursor, Token, TokenKind, TokenStream},
};

/// Longest accepted identifier.
pub const MAX_NAME_LENGTH: usize = 64;

/// Reserved words of Luau. Names end up verbatim in the generated module.
pub const LUAU_RESERVED: [&str; 21] = [
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Parses a token stream into a validated [`Schema`].
pub fn parse(tokens: &TokenStream) -> Result<Schema, CompileError> {
    Parser::new(tokens).parse_schema()
}

/// Checks that `name` is an identifier: `[A-Za-z_][A-Za-z0-9_]*`, at most
/// [`MAX_NAME_LENGTH`] characters, and not a Luau reserved word.
pub fn validate_name(name: &str) -> Result<(), CompileError> {
    let invalid = |reason: String| CompileError::InvalidNaming {
        name: name.to_string(),
        reason,
    };

    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid(format!(
            "length is longer than {MAX_NAME_LENGTH} characters: {}",
            name.len()
        )));
    }

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("length is 0".to_string())),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err(invalid(format!("a name can not start with '{c}'")));
        }
        Some(_) => {}
    }

    if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(invalid(format!("'{c}' is not allowed in a name")));
    }

    if LUAU_RESERVED.contains(&name) {
        return Err(invalid("it is a reserved word of Luau".to_string()));
    }
    Ok(())
}

/// Builds a [`Schema`] from a [`TokenStream`].
///
/// The parser does not walk the stream linearly: it jumps to each recorded `struct`,
/// `field`, and `exports` keyword and reads the tokens around it. The first error
/// aborts parsing.
pub struct Parser<'a> {
    tokens: &'a TokenStream,
    cursor: Cursor,
    schema: Schema,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenStream) -> Self {
        Parser {
            tokens,
            cursor: Cursor::default(),
            schema: Schema::default(),
        }
    }

    /// Parses every struct and the export, then runs semantic analysis.
    pub fn parse_schema(mut self) -> Result<Schema, CompileError> {
        self.check_preconditions()?;
        self.parse_structs()?;
        self.parse_exports()?;
        analyze(&mut self.schema)?;
        log_schema(&self.schema);
        Ok(self.schema)
    }

    fn check_preconditions(&self) -> Result<(), CompileError> {
        let tokens = self.tokens;
        if tokens.is_empty() {
            return Err(CompileError::NotTokenized);
        }

        match tokens.export_refs() {
            [index] if tokens.get(index + 1).kind == TokenKind::ExportName => {}
            refs => return Err(CompileError::Expected1Export { found: refs.len() }),
        }

        if tokens.struct_refs().is_empty() {
            return Err(CompileError::ExpectedStructs);
        }
        if tokens.field_refs().is_empty() {
            return Err(CompileError::Expected1Field);
        }
        Ok(())
    }

    // --- Struct Parsing ---

    fn parse_structs(&mut self) -> Result<(), CompileError> {
        let tokens = self.tokens;

        for &struct_index in tokens.struct_refs() {
            tokens.jump(&mut self.cursor, struct_index);
            let keyword = tokens.current(&self.cursor);
            let name = tokens.front(&self.cursor);

            validate_name(&name.lexeme)?;
            if name.kind != TokenKind::StructName {
                return Err(CompileError::ExpectedNameForStruct {
                    position: keyword.position,
                });
            }
            if Builtin::from_name(&name.lexeme).is_some() {
                return Err(CompileError::InvalidStructNaming {
                    name: name.lexeme.clone(),
                    position: keyword.position,
                });
            }

            tokens.step_forward(&mut self.cursor, 2);
            let open = tokens.current(&self.cursor);
            if !open.is("{") {
                return Err(CompileError::StructShouldStartWithCurlyBrace {
                    position: keyword.position,
                    found: open.lexeme.clone(),
                });
            }

            let mut current = Struct::new(name.lexeme.clone(), keyword.position);
            self.parse_fields(&mut current, struct_index)?;

            if let Some(existing) = self.schema.structs.get(&current.name) {
                return Err(CompileError::AnotherStructWithSameNameExists {
                    name: current.name,
                    first: existing.position,
                    second: current.position,
                });
            }
            if current.fields.is_empty() {
                return Err(CompileError::AStructMustHaveAtleast1Field { name: current.name });
            }

            // The cursor now rests on the closing brace.
            let next = tokens.front(&self.cursor);
            if !(next.is("struct") || next.is("exports")) {
                return Err(CompileError::UnexpectedTokenAfterStruct {
                    lexeme: next.lexeme.clone(),
                    position: next.position,
                });
            }

            self.schema.structs.insert(current.name.clone(), current);
        }

        Ok(())
    }

    /// Parses the fields of `current`, starting with the cursor on its opening brace
    /// and leaving it on the closing one.
    fn parse_fields(&mut self, current: &mut Struct, start: usize) -> Result<(), CompileError> {
        let tokens = self.tokens;

        if tokens.front(&self.cursor).is("}") {
            tokens.step_forward(&mut self.cursor, 1);
            return Ok(());
        }

        for &field_index in tokens.field_refs() {
            if field_index < start {
                continue;
            }

            if let Some(stray) = tokens
                .tokens()
                .get(self.cursor.index() + 1..field_index)
                .unwrap_or_default()
                .iter()
                .find(|token| token.kind != TokenKind::Comment)
            {
                return Err(CompileError::UnexpectedTokenAfterField {
                    lexeme: stray.lexeme.clone(),
                    position: stray.position,
                });
            }

            let field = self.parse_field(field_index)?;
            if current.field(&field.name).is_some() {
                return Err(CompileError::AnotherFieldWithSameNameExists {
                    struct_name: current.name.clone(),
                    field: field.name,
                });
            }
            let field_name = field.name.clone();
            current.push_field(field);

            let next = tokens.front(&self.cursor);
            if next.is("}") {
                tokens.step_forward(&mut self.cursor, 1);
                return Ok(());
            }
            if !next.is("field") {
                return Err(CompileError::ExpectedFieldAfterAnotherField {
                    field: field_name,
                    position: next.position,
                    struct_name: current.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Parses the field whose `field` keyword sits at `at`, leaving the cursor on the
    /// last token of its type.
    fn parse_field(&mut self, at: usize) -> Result<Field, CompileError> {
        let tokens = self.tokens;
        tokens.jump(&mut self.cursor, at);
        let keyword = tokens.current(&self.cursor);
        let name = tokens.front(&self.cursor);

        validate_name(&name.lexeme)?;
        if name.kind != TokenKind::FieldName {
            return Err(CompileError::ExpectedNameForField {
                position: keyword.position,
            });
        }

        tokens.step_forward(&mut self.cursor, 2);
        if tokens.current(&self.cursor).is(":") {
            tokens.step_forward(&mut self.cursor, 1);
        }

        Ok(Field {
            name: name.lexeme.clone(),
            type_ref: self.parse_type()?,
        })
    }

    // --- Type Parsing ---

    fn parse_type(&mut self) -> Result<TypeRef, CompileError> {
        let tokens = self.tokens;
        let first = tokens.current(&self.cursor);

        if first.is("{") {
            self.parse_map()
        } else if first.is("[") {
            self.parse_array()
        } else {
            expect_type(first)?;
            Ok(TypeRef::scalar(&first.lexeme))
        }
    }

    /// `{ValueType} map` or `{ValueType} smap`.
    fn parse_map(&mut self) -> Result<TypeRef, CompileError> {
        let tokens = self.tokens;
        let opened_at = tokens.current(&self.cursor).position;

        let value = tokens.advance(&mut self.cursor);
        if value.is("}") {
            return Err(CompileError::NoTypeSpecifiedForMap { position: opened_at });
        }
        if !tokens.advance(&mut self.cursor).is("}") {
            return Err(CompileError::CurlyBraceNotClosed { position: opened_at });
        }

        let keyword = tokens.advance(&mut self.cursor);
        let short = if keyword.is("map") {
            false
        } else if keyword.is("smap") {
            true
        } else {
            return Err(CompileError::ExpectedMapDefinition { position: opened_at });
        };

        expect_type(value)?;
        Ok(TypeRef {
            element: ElementType::resolve(&value.lexeme),
            shape: TypeShape::Map { short },
        })
    }

    /// `[N]ElementType` or `[]ElementType`.
    fn parse_array(&mut self) -> Result<TypeRef, CompileError> {
        let tokens = self.tokens;
        let opened_at = tokens.current(&self.cursor).position;
        let not_closed = |found: &Token| CompileError::BracketNotClosed {
            opened_at,
            found: found.lexeme.clone(),
            position: found.position,
        };

        let next = tokens.advance(&mut self.cursor);
        let size = if next.kind == TokenKind::Int {
            let size = next
                .lexeme
                .parse::<usize>()
                .ok()
                .filter(|&size| size > 0)
                .ok_or_else(|| CompileError::InvalidArraySize {
                    lexeme: next.lexeme.clone(),
                    position: next.position,
                })?;

            let close = tokens.advance(&mut self.cursor);
            if !close.is("]") {
                return Err(not_closed(close));
            }
            Some(size)
        } else if next.is("]") {
            None
        } else {
            return Err(not_closed(next));
        };

        let element = tokens.advance(&mut self.cursor);
        expect_type(element)?;
        Ok(TypeRef {
            element: ElementType::resolve(&element.lexeme),
            shape: TypeShape::Array { size },
        })
    }

    // --- Export Parsing ---

    fn parse_exports(&mut self) -> Result<(), CompileError> {
        let tokens = self.tokens;
        let &index = tokens
            .export_refs()
            .first()
            .ok_or(CompileError::Expected1Export { found: 0 })?;
        let keyword = tokens.get(index);

        tokens.jump(&mut self.cursor, index + 1);
        let name = tokens.current(&self.cursor);

        validate_name(&name.lexeme)?;
        if name.kind != TokenKind::ExportName {
            return Err(CompileError::ExpectedNameForExport {
                position: keyword.position,
            });
        }
        if !self.schema.structs.contains_key(&name.lexeme) {
            return Err(CompileError::DidntFoundAStructToExport {
                name: name.lexeme.clone(),
            });
        }

        self.schema.exports = name.lexeme.clone();
        Ok(())
    }
}

fn expect_type(token: &Token) -> Result<(), CompileError> {
    validate_name(&token.lexeme)?;
    if token.kind != TokenKind::Type {
        return Err(CompileError::ExpectedAValidType {
            lexeme: token.lexeme.clone(),
            position: token.position,
        });
    }
    Ok(())
}

// ------ Semantic analysis ------

/// Counts references between structs, rejects a referenced export, and rejects
/// cyclic or unknown struct references.
pub fn analyze(schema: &mut Schema) -> Result<(), CompileError> {
    let edges: Vec<(String, String)> = schema
        .structs
        .values()
        .flat_map(|source| {
            source
                .other_struct_references
                .keys()
                .map(move |target| (source.name.clone(), target.clone()))
        })
        .collect();

    for (source, target) in edges {
        if let Some(target) = schema.structs.get_mut(&target) {
            target.ever_referenced = true;
            *target.referenced_by.entry(source).or_default() += 1;
        }
    }

    if let Some(export) = schema.export_struct() {
        if export.ever_referenced {
            return Err(CompileError::ExportStructCantBeReferenced {
                export: export.name.clone(),
                referenced_by: export.referenced_by.keys().cloned().collect(),
            });
        }
    }

    detect_cycles(&schema.structs)
}

/// Walks the reference graph from every struct, since an unreachable cluster can
/// still hold a cycle.
fn detect_cycles(structs: &IndexMap<String, Struct>) -> Result<(), CompileError> {
    let mut done = HashSet::new();
    for name in structs.keys() {
        let mut path = Vec::new();
        let mut active = HashSet::new();
        check_path(structs, name, &mut path, &mut active, &mut done)?;
    }
    Ok(())
}

/// `active` holds the structs on the current branch; every insert is matched by a
/// removal once the branch is done. `done` holds structs whose whole reference
/// graph is already known to be acyclic.
fn check_path<'s>(
    structs: &'s IndexMap<String, Struct>,
    current: &'s str,
    path: &mut Vec<&'s str>,
    active: &mut HashSet<&'s str>,
    done: &mut HashSet<&'s str>,
) -> Result<(), CompileError> {
    if done.contains(current) {
        return Ok(());
    }
    if active.contains(current) {
        if active.len() == 1 {
            let fields = structs
                .get(current)
                .map(|s| s.fields_referencing(current))
                .unwrap_or_default();
            return Err(CompileError::AStructCantReferenceItself {
                name: current.to_string(),
                fields,
            });
        }
        let path = path
            .iter()
            .chain(std::iter::once(&current))
            .map(|name| name.to_string())
            .collect();
        return Err(CompileError::CyclicReference { path });
    }

    let Some(node) = structs.get(current) else {
        return Err(CompileError::UnknownType {
            name: current.to_string(),
            used_in: path.last().map(|name| name.to_string()).unwrap_or_default(),
        });
    };

    active.insert(current);
    path.push(current);
    for target in node.other_struct_references.keys() {
        check_path(structs, target, path, active, done)?;
    }
    path.pop();
    active.remove(current);
    done.insert(current);

    Ok(())
}

fn log_schema(schema: &Schema) {
    debug!(
        "parsed {} structs, exporting '{}'",
        schema.structs.len(),
        schema.exports
    );
    for s in schema.structs.values() {
        debug!(
            "struct '{}' at '{}': {} fields, ever referenced: {}",
            s.name,
            s.position,
            s.fields.len(),
            s.ever_referenced
        );
        for (name, count) in &s.referenced_by {
            debug!("  referenced by '{name}' {count} times");
        }
        for (name, fields) in &s.other_struct_references {
            debug!("  references '{name}' from {} fields", fields.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Position, scan};

    fn parse_source(source: &str) -> Result<Schema, CompileError> {
        parse(&scan(source)?)
    }

    #[test]
    fn test_parse_simple_struct() {
        let schema = parse_source("struct Point { field x : f32 field y : f32 } exports Point").unwrap();

        assert_eq!(schema.exports, "Point");
        let point = &schema.structs["Point"];
        assert_eq!(point.position, Position::new(1, 1));
        assert_eq!(point.fields.len(), 2);
        assert_eq!(point.fields[0].name, "x");
        assert_eq!(point.fields[1].name, "y");
        assert_eq!(point.fields[1].type_ref, TypeRef::scalar("f32"));
        assert!(!point.ever_referenced);
    }

    #[test]
    fn test_separator_is_optional() {
        let with = parse_source("struct A { field a : u8 } exports A").unwrap();
        let without = parse_source("struct A { field a u8 } exports A").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_parse_arrays() {
        let schema =
            parse_source("struct A { field fixed [5]u8 field dynamic []bool field nested [2]B } struct B { field v u8 } exports A")
                .unwrap();
        let a = &schema.structs["A"];

        assert_eq!(a.fields[0].type_ref.shape, TypeShape::Array { size: Some(5) });
        assert_eq!(a.fields[0].type_ref.name(), "u8");
        assert_eq!(a.fields[1].type_ref.shape, TypeShape::Array { size: None });
        assert_eq!(a.fields[1].type_ref.element, ElementType::Builtin(Builtin::Bool));
        assert!(a.fields[2].type_ref.is_struct_reference());
        assert_eq!(a.other_struct_references["B"].len(), 1);
    }

    #[test]
    fn test_parse_maps() {
        let schema = parse_source("struct A { field m {string} map field s : {u16} smap } exports A").unwrap();
        let a = &schema.structs["A"];
        assert_eq!(a.fields[0].type_ref.shape, TypeShape::Map { short: false });
        assert_eq!(a.fields[0].type_ref.name(), "string");
        assert!(a.fields[1].type_ref.is_short_map());
    }

    #[test]
    fn test_reference_counts() {
        let schema = parse_source(
            "struct Inner { field v u8 } struct Outer { field a Inner field b []Inner } exports Outer",
        )
        .unwrap();
        let inner = &schema.structs["Inner"];
        assert!(inner.ever_referenced);
        assert_eq!(inner.referenced_by["Outer"], 1);
        assert_eq!(
            schema.structs["Outer"].other_struct_references["Inner"]
                .iter()
                .copied()
                .collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("_valid_Name9").is_ok());
        assert!(validate_name(&"a".repeat(64)).is_ok());
        assert!(validate_name(&"a".repeat(65)).is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name("9lives").is_err());
        assert!(validate_name("{").is_err());
        assert!(validate_name("a-b").is_err());
    }

    #[test]
    fn test_luau_reserved_words_are_rejected() {
        for word in ["end", "local", "nil", "then", "function"] {
            assert!(matches!(
                validate_name(word),
                Err(CompileError::InvalidNaming { name, .. }) if name == word
            ));
        }
        assert!(validate_name("ending").is_ok());

        let err = parse_source("struct A { field end u8 } exports A").unwrap_err();
        assert!(matches!(err, CompileError::InvalidNaming { name, .. } if name == "end"));
    }

    #[test]
    fn test_preconditions() {
        assert!(matches!(parse(&scan("").unwrap()), Err(CompileError::NotTokenized)));
        assert!(matches!(
            parse_source("struct A { field a u8 }"),
            Err(CompileError::Expected1Export { found: 0 })
        ));
        assert!(matches!(
            parse_source("struct A { field a u8 } exports A exports A"),
            Err(CompileError::Expected1Export { found: 2 })
        ));
        assert!(matches!(
            parse_source("struct A { field a u8 } exports"),
            Err(CompileError::Expected1Export { found: 1 })
        ));
        assert!(matches!(parse_source("exports A"), Err(CompileError::ExpectedStructs)));
        assert!(matches!(
            parse_source("struct A { } exports A"),
            Err(CompileError::Expected1Field)
        ));
    }

    #[test]
    fn test_empty_struct() {
        let err = parse_source("struct A { field a u8 } struct B { } exports A").unwrap_err();
        assert!(matches!(err, CompileError::AStructMustHaveAtleast1Field { name } if name == "B"));
    }

    #[test]
    fn test_duplicate_struct() {
        let err = parse_source("struct A { field f u8 }\nstruct A { field f u8 } exports A").unwrap_err();
        match err {
            CompileError::AnotherStructWithSameNameExists { name, first, second } => {
                assert_eq!(name, "A");
                assert_eq!(first, Position::new(1, 1));
                assert_eq!(second, Position::new(2, 1));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_field() {
        let err = parse_source("struct A { field f u8 field f u16 } exports A").unwrap_err();
        assert!(matches!(
            err,
            CompileError::AnotherFieldWithSameNameExists { struct_name, field } if struct_name == "A" && field == "f"
        ));
    }

    #[test]
    fn test_struct_name_errors() {
        assert!(matches!(
            parse_source("struct u8 { field f u8 } exports u8"),
            Err(CompileError::InvalidStructNaming { .. })
        ));
        assert!(matches!(
            parse_source("struct { field f u8 } exports A"),
            Err(CompileError::InvalidNaming { .. })
        ));
        assert!(matches!(
            parse_source("struct A field f u8 } exports A"),
            Err(CompileError::StructShouldStartWithCurlyBrace { found, .. }) if found == "field"
        ));
    }

    #[test]
    fn test_field_name_errors() {
        assert!(matches!(
            parse_source("struct A { field struct u8 } exports A"),
            Err(CompileError::ExpectedNameForField { .. })
        ));
        assert!(matches!(
            parse_source("struct A { field a u8 a } exports A"),
            Err(CompileError::ExpectedFieldAfterAnotherField { field, .. }) if field == "a"
        ));
        assert!(matches!(
            parse_source("struct A { x field a u8 } exports A"),
            Err(CompileError::UnexpectedTokenAfterField { lexeme, .. }) if lexeme == "x"
        ));
    }

    #[test]
    fn test_type_errors() {
        assert!(matches!(
            parse_source("struct A { field a {} map } exports A"),
            Err(CompileError::NoTypeSpecifiedForMap { .. })
        ));
        assert!(matches!(
            parse_source("struct A { field a {u8 map } exports A"),
            Err(CompileError::CurlyBraceNotClosed { .. })
        ));
        assert!(matches!(
            parse_source("struct A { field a {u8} list } exports A"),
            Err(CompileError::ExpectedMapDefinition { .. })
        ));
        assert!(matches!(
            parse_source("struct A { field a [5 u8 } exports A"),
            Err(CompileError::BracketNotClosed { found, .. }) if found == "u8"
        ));
        assert!(matches!(
            parse_source("struct A { field a [u8] } exports A"),
            Err(CompileError::BracketNotClosed { found, .. }) if found == "u8"
        ));
        assert!(matches!(
            parse_source("struct A { field a [0]u8 } exports A"),
            Err(CompileError::InvalidArraySize { .. })
        ));
        assert!(matches!(
            parse_source("struct A { field a [4]field } exports A"),
            Err(CompileError::ExpectedAValidType { lexeme, .. }) if lexeme == "field"
        ));
        assert!(matches!(
            parse_source("struct A { field a } exports A"),
            Err(CompileError::InvalidNaming { .. })
        ));
    }

    #[test]
    fn test_unexpected_token_after_struct() {
        let err = parse_source("struct A { field a u8 } } exports A").unwrap_err();
        assert!(matches!(err, CompileError::UnexpectedTokenAfterStruct { lexeme, .. } if lexeme == "}"));
    }

    #[test]
    fn test_missing_export_struct() {
        let err = parse_source("struct A { field a u8 } exports B").unwrap_err();
        assert!(matches!(err, CompileError::DidntFoundAStructToExport { name } if name == "B"));
    }

    #[test]
    fn test_export_cant_be_referenced() {
        let err =
            parse_source("struct A { field a u8 } struct B { field a A } struct C { field a []A } exports A")
                .unwrap_err();
        match err {
            CompileError::ExportStructCantBeReferenced { export, referenced_by } => {
                assert_eq!(export, "A");
                assert_eq!(referenced_by, vec!["B", "C"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_self_reference() {
        let err = parse_source("struct A { field a u8 } struct Node { field v u8 field next Node } exports A")
            .unwrap_err();
        match err {
            CompileError::AStructCantReferenceItself { name, fields } => {
                assert_eq!(name, "Node");
                assert_eq!(fields, vec!["next:Node"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_circular_dependency() {
        let err = parse_source("struct E { field v u8 } struct A { field b B } struct B { field a A } exports E")
            .unwrap_err();
        match err {
            CompileError::CyclicReference { path } => assert_eq!(path, vec!["A", "B", "A"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_cycle_reached_through_another_struct() {
        let err = parse_source(
            "struct E { field v u8 } struct X { field a A } struct A { field b B } struct B { field a A } exports E",
        )
        .unwrap_err();
        match err {
            CompileError::CyclicReference { path } => assert_eq!(path, vec!["X", "A", "B", "A"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_reached_through_another_struct_is_a_cycle() {
        let err = parse_source(
            "struct X { field n Node } struct Node { field next Node } struct R { field v u8 } exports R",
        )
        .unwrap_err();
        match err {
            CompileError::CyclicReference { path } => assert_eq!(path, vec!["X", "Node", "Node"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_shared_dependencies_are_checked_once() {
        // Every struct references the two before it, so the number of distinct
        // reference paths grows like the Fibonacci sequence.
        let mut source = String::from("struct S0 { field v u8 } struct S1 { field a S0 }");
        for i in 2..40 {
            source.push_str(&format!(
                " struct S{i} {{ field a S{} field b S{} }}",
                i - 1,
                i - 2
            ));
        }
        source.push_str(" struct Root { field top S39 } exports Root");

        let schema = parse_source(&source).unwrap();
        assert_eq!(schema.structs.len(), 41);
        assert_eq!(schema.structs["S0"].referenced_by["S2"], 1);
    }

    #[test]
    fn test_unknown_type() {
        let err = parse_source("struct A { field a Missing } exports A").unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnknownType { name, used_in } if name == "Missing" && used_in == "A"
        ));
    }
}
