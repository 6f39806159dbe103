use std::collections::HashMap;

use async_graphql_parser::{types::OperationDefinition, Positioned};
use async_graphql_value::Name;

use crate::validation::visitor::{Rule, Visitor, VisitorContext};

pub(crate) struct UniqueVariableNames;

impl<'a> Visitor<'a> for UniqueVariableNames {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        _name: Option<&'a Name>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        let mut seen = HashMap::new();

        for variable_definition in &operation.node.variable_definitions {
            let name = &variable_definition.node.name;
            match seen.get(name.node.as_str()) {
                Some(first) => ctx.report_error(
                    Rule::UniqueVariableNames,
                    vec![*first, name.pos],
                    format!("There can be only one variable named \"${}\".", name.node),
                ),
                None => {
                    seen.insert(name.node.as_str(), name.pos);
                }
            }
        }
    }
}
