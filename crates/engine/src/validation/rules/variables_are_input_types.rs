use async_graphql_parser::{types::VariableDefinition, Positioned};

use crate::{
    schema::TypeRef,
    validation::visitor::{Rule, Visitor, VisitorContext},
};

pub(crate) struct VariablesAreInputTypes;

impl<'a> Visitor<'a> for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        variable_definition: &'a Positioned<VariableDefinition>,
    ) {
        let var_type = &variable_definition.node.var_type;
        let ty = TypeRef::from(&var_type.node);

        if ctx
            .schema
            .type_definition(ty.named_type())
            .is_some_and(|ty| !ty.is_input_type())
        {
            ctx.report_error(
                Rule::VariablesAreInputTypes,
                vec![var_type.pos],
                format!(
                    "Variable \"${}\" cannot be non-input type \"{}\".",
                    variable_definition.node.name.node, var_type.node
                ),
            );
        }
    }
}
