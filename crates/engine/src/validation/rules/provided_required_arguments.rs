use async_graphql_parser::{
    types::{Directive, Field},
    Positioned,
};

use crate::{
    schema::DirectiveLocation,
    validation::visitor::{Rule, Visitor, VisitorContext},
};

pub(crate) struct ProvidedRequiredArguments;

impl<'a> Visitor<'a> for ProvidedRequiredArguments {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(parent) = ctx.current_type() else {
            return;
        };
        let Some(definition) = parent.field(&field.node.name.node) else {
            return;
        };

        for argument in definition.arguments.values() {
            if argument.is_required() && field.node.get_argument(&argument.name).is_none() {
                ctx.report_error(
                    Rule::ProvidedRequiredArguments,
                    vec![field.pos],
                    format!(
                        "Field \"{}.{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        parent.name(),
                        definition.name,
                        argument.name,
                        argument.ty
                    ),
                );
            }
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
        _location: DirectiveLocation,
    ) {
        let schema = ctx.schema;
        let Some(definition) = schema.directive(&directive.node.name.node) else {
            return;
        };

        for argument in definition.arguments.values() {
            if argument.is_required() && directive.node.get_argument(&argument.name).is_none() {
                ctx.report_error(
                    Rule::ProvidedRequiredArguments,
                    vec![directive.pos],
                    format!(
                        "Directive \"@{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        definition.name, argument.name, argument.ty
                    ),
                );
            }
        }
    }
}
