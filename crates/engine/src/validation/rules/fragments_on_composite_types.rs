use async_graphql_parser::{
    types::{FragmentDefinition, InlineFragment},
    Positioned,
};
use async_graphql_value::Name;

use crate::validation::visitor::{Rule, Visitor, VisitorContext};

pub(crate) struct FragmentsOnCompositeTypes;

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a Name,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        let on = &fragment.node.type_condition.node.on;
        if ctx.schema.type_definition(&on.node).is_some_and(|ty| !ty.is_composite()) {
            ctx.report_error(
                Rule::FragmentsOnCompositeTypes,
                vec![on.pos],
                format!("Fragment \"{name}\" cannot condition on non composite type \"{}\".", on.node),
            );
        }
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a Positioned<InlineFragment>) {
        let Some(condition) = &fragment.node.type_condition else {
            return;
        };

        let on = &condition.node.on;
        if ctx.schema.type_definition(&on.node).is_some_and(|ty| !ty.is_composite()) {
            ctx.report_error(
                Rule::FragmentsOnCompositeTypes,
                vec![on.pos],
                format!("Fragment cannot condition on non composite type \"{}\".", on.node),
            );
        }
    }
}
