use std::collections::{HashMap, HashSet};

use async_graphql_parser::{
    types::{FragmentSpread, Selection, SelectionSet},
    Positioned,
};
use async_graphql_value::Value;

use crate::{
    schema::{TypeDefinition, TypeRef},
    Schema,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

/// Which fragments each operation and fragment spreads directly.
#[derive(Default)]
pub(crate) struct SpreadGraph<'a> {
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
}

impl<'a> SpreadGraph<'a> {
    pub fn add(&mut self, scope: Scope<'a>, fragment: &'a str) {
        self.spreads.entry(scope).or_default().push(fragment);
    }

    /// `from` followed by every fragment it reaches, directly or not.
    pub fn reachable(&self, from: Scope<'a>) -> Vec<Scope<'a>> {
        let mut visited = HashSet::new();
        let mut reachable = Vec::new();
        let mut stack = vec![from];

        while let Some(scope) = stack.pop() {
            if !visited.insert(scope) {
                continue;
            }
            reachable.push(scope);

            if let Some(fragments) = self.spreads.get(&scope) {
                stack.extend(fragments.iter().rev().map(|fragment| Scope::Fragment(fragment)));
            }
        }

        reachable
    }
}

pub(crate) fn referenced_variables(value: &Value) -> Vec<&str> {
    let mut vars = Vec::new();
    referenced_variables_to_vec(value, &mut vars);
    vars
}

fn referenced_variables_to_vec<'a>(value: &'a Value, vars: &mut Vec<&'a str>) {
    match value {
        Value::Variable(name) => {
            vars.push(name);
        }
        Value::List(values) => values.iter().for_each(|value| referenced_variables_to_vec(value, vars)),
        Value::Object(obj) => obj.values().for_each(|value| referenced_variables_to_vec(value, vars)),
        _ => {}
    }
}

/// Fragment spreads of a selection set, including those nested in fields and inline fragments.
pub(crate) fn fragment_spreads(selection_set: &SelectionSet) -> Vec<&Positioned<FragmentSpread>> {
    let mut spreads = Vec::new();
    let mut stack = vec![selection_set];

    while let Some(selection_set) = stack.pop() {
        for selection in selection_set.items.iter().rev() {
            match &selection.node {
                Selection::Field(field) => stack.push(&field.node.selection_set.node),
                Selection::FragmentSpread(spread) => spreads.push(spread),
                Selection::InlineFragment(fragment) => stack.push(&fragment.node.selection_set.node),
            }
        }
    }

    spreads.sort_by_key(|spread| (spread.pos.line, spread.pos.column));
    spreads
}

/// Object types a value of the given composite type can have.
pub(crate) fn possible_types<'a>(schema: &'a Schema, ty: &'a TypeDefinition) -> Vec<&'a str> {
    match ty {
        TypeDefinition::Object(object) => vec![object.name.as_str()],
        TypeDefinition::Interface(_) | TypeDefinition::Union(_) => schema.possible_types(ty.name()),
        _ => Vec::new(),
    }
}

/// Whether a variable of type `variable` may flow into a location of type `location`.
pub(crate) fn is_variable_type_compatible(variable: &TypeRef, location: &TypeRef) -> bool {
    match (variable, location) {
        (TypeRef::NonNull(variable), TypeRef::NonNull(location)) => is_variable_type_compatible(variable, location),
        (TypeRef::NonNull(variable), location) => is_variable_type_compatible(variable, location),
        (_, TypeRef::NonNull(_)) => false,
        (TypeRef::List(variable), TypeRef::List(location)) => is_variable_type_compatible(variable, location),
        (TypeRef::List(_), _) | (_, TypeRef::List(_)) => false,
        (TypeRef::Named(variable), TypeRef::Named(location)) => variable == location,
    }
}
