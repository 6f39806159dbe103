use async_graphql_parser::Positioned;
use async_graphql_value::{Name, Value};

use crate::validation::visitor::{ArgumentOwner, Rule, Visitor, VisitorContext};

pub(crate) struct KnownArgumentNames;

impl<'a> Visitor<'a> for KnownArgumentNames {
    fn enter_argument(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        owner: ArgumentOwner<'a>,
        name: &'a Positioned<Name>,
        _value: &'a Positioned<Value>,
    ) {
        if owner.argument(&name.node).is_some() {
            return;
        }

        let message = match owner {
            ArgumentOwner::Field { parent_type, field } => {
                format!("Unknown argument \"{}\" on field \"{parent_type}.{}\".", name.node, field.name)
            }
            ArgumentOwner::Directive(directive) => {
                format!("Unknown argument \"{}\" on directive \"@{}\".", name.node, directive.name)
            }
            ArgumentOwner::Unknown => return,
        };

        ctx.report_error(Rule::KnownArgumentNames, vec![name.pos], message);
    }
}
