use std::collections::HashMap;

use async_graphql_parser::{types::Directive, Positioned};

use crate::{
    schema::DirectiveLocation,
    validation::visitor::{Rule, Visitor, VisitorContext},
};

pub(crate) struct UniqueDirectivesPerLocation;

impl<'a> Visitor<'a> for UniqueDirectivesPerLocation {
    fn enter_directives(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directives: &'a [Positioned<Directive>],
        _location: DirectiveLocation,
    ) {
        let schema = ctx.schema;
        let mut seen = HashMap::new();

        for directive in directives {
            let name = directive.node.name.node.as_str();
            // Unknown directives are reported elsewhere.
            let Some(definition) = schema.directive(name) else {
                continue;
            };
            if definition.is_repeatable {
                continue;
            }

            match seen.get(name) {
                Some(first) => ctx.report_error(
                    Rule::UniqueDirectivesPerLocation,
                    vec![*first, directive.pos],
                    format!("The directive \"@{name}\" can only be used once at this location."),
                ),
                None => {
                    seen.insert(name, directive.pos);
                }
            }
        }
    }
}
