use std::collections::{HashMap, HashSet};

use async_graphql_parser::{
    types::{ExecutableDocument, FragmentDefinition, FragmentSpread, OperationDefinition, VariableDefinition},
    Positioned,
};
use async_graphql_value::{Name, Value};

use crate::validation::{
    utils::{referenced_variables, Scope, SpreadGraph},
    visitor::{ArgumentOwner, Rule, Visitor, VisitorContext},
};

#[derive(Default)]
pub(crate) struct NoUnusedVariables<'a> {
    defined: HashMap<Option<&'a str>, &'a [Positioned<VariableDefinition>]>,
    used: HashMap<Scope<'a>, HashSet<&'a str>>,
    spreads: SpreadGraph<'a>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> Visitor<'a> for NoUnusedVariables<'a> {
    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {
        let mut operations = doc.operations.iter().collect::<Vec<_>>();
        operations.sort_by_key(|(_, operation)| (operation.pos.line, operation.pos.column));

        for (name, _) in operations {
            let name = name.map(Name::as_str);
            let Some(definitions) = self.defined.get(&name) else {
                continue;
            };

            let used = self
                .spreads
                .reachable(Scope::Operation(name))
                .into_iter()
                .filter_map(|scope| self.used.get(&scope))
                .flatten()
                .copied()
                .collect::<HashSet<_>>();

            for definition in definitions.iter() {
                let variable = definition.node.name.node.as_str();
                if used.contains(variable) {
                    continue;
                }

                let message = match name {
                    Some(name) => format!("Variable \"${variable}\" is never used in operation \"{name}\"."),
                    None => format!("Variable \"${variable}\" is never used."),
                };
                ctx.report_error(Rule::NoUnusedVariables, vec![definition.pos], message);
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

    fn enter_argument(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _owner: ArgumentOwner<'a>,
        _name: &'a Positioned<Name>,
        value: &'a Positioned<Value>,
    ) {
        if let Some(scope) = self.current_scope {
            self.used
                .entry(scope)
                .or_default()
                .extend(referenced_variables(&value.node));
        }
    }

    fn enter_fragment_spread(&mut self, _ctx: &mut VisitorContext<'a>, spread: &'a Positioned<FragmentSpread>) {
        if let Some(scope) = self.current_scope {
            self.spreads.add(scope, &spread.node.fragment_name.node);
        }
    }
}
