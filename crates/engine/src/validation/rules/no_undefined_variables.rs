use std::collections::{HashMap, HashSet};

use async_graphql_parser::{
    types::{ExecutableDocument, FragmentDefinition, FragmentSpread, OperationDefinition},
    Pos, Positioned,
};
use async_graphql_value::{Name, Value};

use crate::validation::{
    utils::{referenced_variables, Scope, SpreadGraph},
    visitor::{ArgumentOwner, Rule, Visitor, VisitorContext},
};

#[derive(Default)]
pub(crate) struct NoUndefinedVariables<'a> {
    defined: HashMap<Option<&'a str>, (Pos, HashSet<&'a str>)>,
    used: HashMap<Scope<'a>, Vec<(&'a str, Pos)>>,
    spreads: SpreadGraph<'a>,
    current_scope: Option<Scope<'a>>,
}

impl<'a> Visitor<'a> for NoUndefinedVariables<'a> {
    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {
        let mut operations = doc.operations.iter().collect::<Vec<_>>();
        operations.sort_by_key(|(_, operation)| (operation.pos.line, operation.pos.column));

        for (name, _) in operations {
            let name = name.map(Name::as_str);
            let Some((operation_pos, defined)) = self.defined.get(&name) else {
                continue;
            };

            for scope in self.spreads.reachable(Scope::Operation(name)) {
                for (variable, pos) in self.used.get(&scope).into_iter().flatten() {
                    if defined.contains(variable) {
                        continue;
                    }

                    let message = match name {
                        Some(name) => format!("Variable \"${variable}\" is not defined by operation \"{name}\"."),
                        None => format!("Variable \"${variable}\" is not defined."),
                    };
                    ctx.report_error(Rule::NoUndefinedVariables, vec![*pos, *operation_pos], message);
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

        let variables = operation
            .node
            .variable_definitions
            .iter()
            .map(|variable| variable.node.name.node.as_str())
            .collect();
        self.defined.insert(name, (operation.pos, variables));
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
                .extend(referenced_variables(&value.node).into_iter().map(|variable| (variable, value.pos)));
        }
    }

    fn enter_fragment_spread(&mut self, _ctx: &mut VisitorContext<'a>, spread: &'a Positioned<FragmentSpread>) {
        if let Some(scope) = self.current_scope {
            self.spreads.add(scope, &spread.node.fragment_name.node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory<'a>() -> NoUndefinedVariables<'a> {
        NoUndefinedVariables::default()
    }

    #[test]
    fn all_variables_defined() {
        expect_passes_rule!(
            factory,
            r"
          query Foo($a: String, $b: String, $c: String) {
            field(a: $a, b: $b, c: $c)
          }
        ",
        );
    }

    #[test]
    fn all_variables_deeply_defined_in_inline_fragments() {
        expect_passes_rule!(
            factory,
            r"
          query Foo($a: String, $b: String, $c: String) {
            ... on Type {
              field(a: $a) {
                field(b: $b) {
                  ... on Type {
                    field(c: $c)
                  }
                }
              }
            }
          }
        ",
        );
    }

    #[test]
    fn all_variables_in_fragments_deeply_defined() {
        expect_passes_rule!(
            factory,
            r"
          query Foo($a: String, $b: String, $c: String) {
            ...FragA
          }
          fragment FragA on Type {
            field(a: $a) {
              ...FragB
            }
          }
          fragment FragB on Type {
            field(b: $b) {
              ...FragC
            }
          }
          fragment FragC on Type {
            field(c: $c)
          }
        ",
        );
    }

    #[test]
    fn variable_within_recursive_fragment_defined() {
        expect_passes_rule!(
            factory,
            r"
          query Foo($a: String) {
            ...FragA
          }
          fragment FragA on Type {
            field(a: $a) {
              ...FragA
            }
          }
        ",
        );
    }

    #[test]
    fn variable_not_defined() {
        let errors = rule_errors!(factory, "query Foo($a: String) { field(a: $a, d: $d) }");
        assert_eq!(
            errors,
            vec![r#"[1:41, 1:1] Variable "$d" is not defined by operation "Foo"."#]
        );
    }

    #[test]
    fn variable_not_defined_by_unnamed_query() {
        let errors = rule_errors!(factory, "{ field(a: $a) }");
        assert_eq!(errors, vec![r#"[1:12, 1:1] Variable "$a" is not defined."#]);
    }

    #[test]
    fn variable_in_fragment_not_defined_by_operation() {
        expect_fails_rule!(
            factory,
            r"
          query Foo($a: String, $b: String) {
            ...FragA
          }
          fragment FragA on Type {
            field(a: $a) {
              ...FragB
            }
          }
          fragment FragB on Type {
            field(b: $b) {
              ...FragC
            }
          }
          fragment FragC on Type {
            field(c: $c)
          }
        ",
        );
    }

    #[test]
    fn variable_in_directive_not_defined() {
        expect_fails_rule!(
            factory,
            r"
          query Foo {
            field @include(if: $condition)
          }
        ",
        );
    }
}
