use std::collections::HashSet;

use async_graphql_parser::{
    types::{OperationDefinition, OperationType, Selection, SelectionSet},
    Pos, Positioned,
};
use async_graphql_value::Name;
use indexmap::IndexMap;

use crate::validation::visitor::{Rule, Visitor, VisitorContext};

pub(crate) struct SingleFieldSubscriptions;

impl<'a> Visitor<'a> for SingleFieldSubscriptions {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: Option<&'a Name>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        if operation.node.ty != OperationType::Subscription {
            return;
        }

        let mut fields = IndexMap::new();
        collect_root_fields(ctx, &operation.node.selection_set.node, &mut HashSet::new(), &mut fields);

        if fields.len() > 1 {
            let message = match name {
                Some(name) => format!("Subscription \"{name}\" must select only one top level field."),
                None => "Anonymous Subscription must select only one top level field.".to_string(),
            };
            ctx.report_error(
                Rule::SingleFieldSubscriptions,
                fields.values().skip(1).copied().collect(),
                message,
            );
        }
    }
}

fn collect_root_fields<'a>(
    ctx: &VisitorContext<'a>,
    selection_set: &'a SelectionSet,
    visited: &mut HashSet<&'a str>,
    fields: &mut IndexMap<&'a str, Pos>,
) {
    for selection in &selection_set.items {
        match &selection.node {
            Selection::Field(field) => {
                fields.entry(field.node.response_key().node.as_str()).or_insert(field.pos);
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.as_str();
                if !visited.insert(name) {
                    continue;
                }
                if let Some(fragment) = ctx.fragment(name) {
                    collect_root_fields(ctx, &fragment.node.selection_set.node, visited, fields);
                }
            }
            Selection::InlineFragment(fragment) => {
                collect_root_fields(ctx, &fragment.node.selection_set.node, visited, fields);
            }
        }
    }
}
