use async_graphql_parser::{
    types::{FragmentSpread, InlineFragment},
    Positioned,
};

use crate::{
    schema::TypeDefinition,
    validation::{
        utils::possible_types,
        visitor::{Rule, Visitor, VisitorContext},
    },
    Schema,
};

pub(crate) struct PossibleFragmentSpreads;

impl<'a> Visitor<'a> for PossibleFragmentSpreads {
    fn enter_fragment_spread(&mut self, ctx: &mut VisitorContext<'a>, spread: &'a Positioned<FragmentSpread>) {
        let schema = ctx.schema;
        let name = &spread.node.fragment_name.node;
        let Some(parent) = ctx.current_type() else {
            return;
        };
        let Some(fragment) = ctx.fragment(name) else {
            return;
        };
        let Some(ty) = schema.type_definition(&fragment.node.type_condition.node.on.node) else {
            return;
        };

        if !overlap(schema, parent, ty) {
            ctx.report_error(
                Rule::PossibleFragmentSpreads,
                vec![spread.pos],
                format!(
                    "Fragment \"{name}\" cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                    parent.name(),
                    ty.name()
                ),
            );
        }
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a Positioned<InlineFragment>) {
        let schema = ctx.schema;
        let Some(parent) = ctx.current_type() else {
            return;
        };
        let Some(ty) = fragment
            .node
            .type_condition
            .as_ref()
            .and_then(|condition| schema.type_definition(&condition.node.on.node))
        else {
            return;
        };

        if !overlap(schema, parent, ty) {
            ctx.report_error(
                Rule::PossibleFragmentSpreads,
                vec![fragment.pos],
                format!(
                    "Fragment cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                    parent.name(),
                    ty.name()
                ),
            );
        }
    }
}

/// Non-composite types are left to the rule on fragment type conditions.
fn overlap(schema: &Schema, parent: &TypeDefinition, fragment: &TypeDefinition) -> bool {
    if !parent.is_composite() || !fragment.is_composite() || parent.name() == fragment.name() {
        return true;
    }

    let fragment_types = possible_types(schema, fragment);
    possible_types(schema, parent)
        .iter()
        .any(|object| fragment_types.contains(object))
}
