use std::collections::HashMap;

use async_graphql_parser::{
    types::{ExecutableDocument, FragmentDefinition, FragmentSpread, OperationDefinition, VariableDefinition},
    Positioned,
};
use async_graphql_value::{ConstValue, Name, Value};

use crate::{
    schema::TypeRef,
    validation::{
        utils::{is_variable_type_compatible, Scope, SpreadGraph},
        visitor::{InputPosition, Rule, Visitor, VisitorContext},
    },
};

#[derive(Default)]
pub(crate) struct VariablesInAllowedPosition<'a> {
    defined: HashMap<Option<&'a str>, &'a [Positioned<VariableDefinition>]>,
    usages: HashMap<Scope<'a>, Vec<(&'a str, InputPosition<'a>)>>,
    spreads: SpreadGraph<'a>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> Visitor<'a> for VariablesInAllowedPosition<'a> {
    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {
        let mut operations = doc.operations.iter().collect::<Vec<_>>();
        operations.sort_by_key(|(_, operation)| (operation.pos.line, operation.pos.column));

        for (name, _) in operations {
            let name = name.map(Name::as_str);
            let Some(definitions) = self.defined.get(&name) else {
                continue;
            };

            for scope in self.spreads.reachable(Scope::Operation(name)) {
                for (variable, position) in self.usages.get(&scope).into_iter().flatten() {
                    let Some(definition) = definitions
                        .iter()
                        .find(|definition| definition.node.name.node.as_str() == *variable)
                    else {
                        continue;
                    };
                    let Some(expected) = position.expected else {
                        continue;
                    };

                    if !is_allowed(definition, expected, position.has_default) {
                        ctx.report_error(
                            Rule::VariablesInAllowedPosition,
                            vec![definition.pos, position.pos],
                            format!(
                                "Variable \"${variable}\" of type \"{}\" used in position expecting type \"{expected}\".",
                                definition.node.var_type.node
                            ),
                        );
                    }
                }
            }
        }
    }

    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        name: Option<&'a Name>,
        operation: &'a Positioned<OperationDefinition>,
    ) {
        let name = name.map(Name::as_str);
        self.current_scope = Some(Scope::Operation(name));
        self.defined.insert(name, &operation.node.variable_definitions);
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        name: &'a Name,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.current_scope = Some(Scope::Fragment(name));
    }

    fn enter_input_value(&mut self, _ctx: &mut VisitorContext<'a>, position: InputPosition<'a>, value: &'a Value) {
        let (Some(scope), Value::Variable(variable)) = (self.current_scope, value) else {
            return;
        };
        self.usages.entry(scope).or_default().push((variable, position));
    }

    fn enter_fragment_spread(&mut self, _ctx: &mut VisitorContext<'a>, spread: &'a Positioned<FragmentSpread>) {
        if let Some(scope) = self.current_scope {
            self.spreads.add(scope, &spread.node.fragment_name.node);
        }
    }
}

/// A nullable variable may only reach a non-null location when one of them provides a
/// non-null default value.
fn is_allowed(definition: &Positioned<VariableDefinition>, expected: &TypeRef, location_has_default: bool) -> bool {
    let variable = TypeRef::from(&definition.node.var_type.node);

    if expected.is_non_null() && !variable.is_non_null() {
        let has_non_null_default = definition
            .node
            .default_value
            .as_ref()
            .is_some_and(|default| !matches!(default.node, ConstValue::Null));

        if !has_non_null_default && !location_has_default {
            return false;
        }

        return is_variable_type_compatible(&variable, expected.nullable());
    }

    is_variable_type_compatible(&variable, expected)
}
