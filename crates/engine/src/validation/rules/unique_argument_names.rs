use std::collections::{hash_map::Entry, HashMap};

use async_graphql_parser::{
    types::{Directive, Field},
    Positioned,
};
use async_graphql_value::{Name, Value};

use crate::{
    schema::DirectiveLocation,
    validation::visitor::{Rule, Visitor, VisitorContext},
};

pub(crate) struct UniqueArgumentNames;

impl<'a> Visitor<'a> for UniqueArgumentNames {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        check_unique(ctx, &field.node.arguments);
    }

    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Positioned<Directive>,
        _location: DirectiveLocation,
    ) {
        check_unique(ctx, &directive.node.arguments);
    }
}

fn check_unique(ctx: &mut VisitorContext<'_>, arguments: &[(Positioned<Name>, Positioned<Value>)]) {
    let mut seen = HashMap::new();

    for (name, _) in arguments {
        match seen.entry(name.node.as_str()) {
            Entry::Occupied(first) => ctx.report_error(
                Rule::UniqueArgumentNames,
                vec![*first.get(), name.pos],
                format!("There can be only one argument named \"{}\".", name.node),
            ),
            Entry::Vacant(entry) => {
                entry.insert(name.pos);
            }
        }
    }
}
