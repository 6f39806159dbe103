use std::collections::HashSet;

use async_graphql_parser::{
    types::{Directive, ExecutableDocument, Field, Selection, SelectionSet},
    Positioned,
};
use async_graphql_value::Value as Literal;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::schema::{ObjectType, Schema};

/// Fields of a selection, grouped by response key in first-appearance order.
pub(crate) type GroupedFields<'d> = IndexMap<&'d str, Vec<&'d Positioned<Field>>>;

pub(crate) struct FieldCollector<'a, 'd> {
    pub schema: &'a Schema,
    pub document: &'d ExecutableDocument,
    pub variables: &'a Map<String, Value>,
}

impl<'a, 'd> FieldCollector<'a, 'd> {
    /// Flattens fragments applying to `object` and drops what `@skip`/`@include` exclude.
    pub fn collect(&self, object: &ObjectType, selection_sets: &[&'d Positioned<SelectionSet>]) -> GroupedFields<'d> {
        let mut fields = GroupedFields::new();
        let mut visited = HashSet::new();

        for selection_set in selection_sets {
            self.collect_into(object, selection_set, &mut fields, &mut visited);
        }

        fields
    }

    fn collect_into(
        &self,
        object: &ObjectType,
        selection_set: &'d Positioned<SelectionSet>,
        fields: &mut GroupedFields<'d>,
        visited: &mut HashSet<&'d str>,
    ) {
        for selection in &selection_set.node.items {
            if !self.is_included(selection.node.directives()) {
                continue;
            }

            match &selection.node {
                Selection::Field(field) => {
                    fields
                        .entry(field.node.response_key().node.as_str())
                        .or_default()
                        .push(field);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    if !visited.insert(name) {
                        continue;
                    }

                    let Some(fragment) = self.document.fragments.get(name) else {
                        continue;
                    };

                    if self.applies(object, fragment.node.type_condition.node.on.node.as_str()) {
                        self.collect_into(object, &fragment.node.selection_set, fields, visited);
                    }
                }
                Selection::InlineFragment(fragment) => {
                    let applies = match &fragment.node.type_condition {
                        Some(condition) => self.applies(object, condition.node.on.node.as_str()),
                        None => true,
                    };

                    if applies {
                        self.collect_into(object, &fragment.node.selection_set, fields, visited);
                    }
                }
            }
        }
    }

    fn applies(&self, object: &ObjectType, type_condition: &str) -> bool {
        self.schema.is_possible_type(type_condition, &object.name)
    }

    fn is_included(&self, directives: &[Positioned<Directive>]) -> bool {
        directives.iter().all(|directive| match directive.node.name.node.as_str() {
            "skip" => !self.condition(directive),
            "include" => self.condition(directive),
            _ => true,
        })
    }

    fn condition(&self, directive: &Positioned<Directive>) -> bool {
        match directive.node.get_argument("if").map(|value| &value.node) {
            Some(Literal::Boolean(condition)) => *condition,
            Some(Literal::Variable(name)) => self
                .variables
                .get(name.as_str())
                .and_then(Value::as_bool)
                .unwrap_or(false),
            _ => false,
        }
    }
}
