use async_graphql_parser::{types::Field, Positioned};

use crate::validation::visitor::{Rule, Visitor, VisitorContext};

pub(crate) struct FieldsOnCorrectType;

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let Some(parent) = ctx.current_type() else {
            return;
        };
        // Selections on leaf types are reported by the scalar leafs rule.
        if !parent.is_composite() {
            return;
        }

        let name = field.node.name.node.as_str();
        if name == "__typename" || parent.field(name).is_some() {
            return;
        }

        ctx.report_error(
            Rule::FieldsOnCorrectType,
            vec![field.pos],
            format!("Cannot query field \"{name}\" on type \"{}\".", parent.name()),
        );
    }
}
