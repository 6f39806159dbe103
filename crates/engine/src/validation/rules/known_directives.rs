use async_graphql_parser::{types::Directive, Positioned};

use crate::{
    schema::DirectiveLocation,
    validation::visitor::{Rule, Visitor, VisitorContext},
};

pub(crate) struct KnownDirectives;

impl<'a> Visitor<'a> for KnownDirectives {
    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
        location: DirectiveLocation,
    ) {
        let name = directive.node.name.node.as_str();

        match ctx.schema.directive(name) {
            None => ctx.report_error(
                Rule::KnownDirectives,
                vec![directive.pos],
                format!("Unknown directive \"@{name}\"."),
            ),
            Some(definition) if !definition.locations.contains(&location) => ctx.report_error(
                Rule::KnownDirectives,
                vec![directive.pos],
                format!("Directive \"@{name}\" may not be used on {location}."),
            ),
            Some(_) => {}
        }
    }
}
