//! Orders the structs that need generated helpers so that every struct comes after
//! the structs it references.

use std::collections::HashSet;

use tracing::debug;

use crate::ast::Schema;

/// Returns the names of every referenced, non-exported struct with dependencies
/// first.
///
/// Structs that are neither exported nor referenced are left out. The schema must
/// already be free of cycles, which [`crate::parser::parse`] guarantees.
pub fn order(schema: &Schema) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut sorted = Vec::new();

    for (name, s) in &schema.structs {
        if *name == schema.exports || !s.ever_referenced {
            continue;
        }
        visit(schema, name, &mut visited, &mut sorted);
    }

    debug!("dependency order: '{}'", sorted.join(", "));
    sorted
}

fn visit<'s>(
    schema: &'s Schema,
    name: &'s str,
    visited: &mut HashSet<&'s str>,
    sorted: &mut Vec<String>,
) {
    if !visited.insert(name) {
        return;
    }

    if let Some(s) = schema.structs.get(name) {
        for dependency in s.other_struct_references.keys() {
            visit(schema, dependency, visited, sorted);
        }
    }

    sorted.push(name.to_string());
}
