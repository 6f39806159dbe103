use async_graphql_parser::{
    types::{FragmentDefinition, InlineFragment, TypeCondition, VariableDefinition},
    Positioned,
};
use async_graphql_value::Name;

use crate::{
    schema::TypeRef,
    validation::visitor::{Rule, Visitor, VisitorContext},
};

pub(crate) struct KnownTypeNames;

impl<'a> Visitor<'a> for KnownTypeNames {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        let ty = TypeRef::from(&variable_definition.node.var_type.node);
        check_type(ctx, ty.named_type(), variable_definition.node.var_type.pos);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        _name: &'a Name,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        check_condition(ctx, &fragment.node.type_condition);
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a Positioned<InlineFragment>) {
        if let Some(condition) = &fragment.node.type_condition {
            check_condition(ctx, condition);
        }
    }
}

fn check_condition(ctx: &mut VisitorContext<'_>, condition: &Positioned<TypeCondition>) {
    check_type(ctx, &condition.node.on.node, condition.node.on.pos);
}

fn check_type(ctx: &mut VisitorContext<'_>, name: &str, pos: async_graphql_parser::Pos) {
    if ctx.schema.type_definition(name).is_none() {
        ctx.report_error(Rule::KnownTypeNames, vec![pos], format!("Unknown type \"{name}\"."));
    }
}
