use async_graphql_parser::{types::Field, Positioned};

use crate::validation::visitor::{Rule, Visitor, VisitorContext};

pub(crate) struct ScalarLeafs;

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a Positioned<Field>) {
        let schema = ctx.schema;
        let Some(definition) = ctx
            .current_type()
            .and_then(|parent| parent.field(&field.node.name.node))
        else {
            return;
        };
        let Some(ty) = schema.type_definition(definition.ty.named_type()) else {
            return;
        };

        let name = &field.node.name.node;
        let has_selection = !field.node.selection_set.node.items.is_empty();

        if ty.is_leaf() && has_selection {
            ctx.report_error(
                Rule::ScalarLeafs,
                vec![field.pos],
                format!(
                    "Field \"{name}\" must not have a selection since type \"{}\" has no subfields.",
                    definition.ty
                ),
            );
        } else if !ty.is_leaf() && !has_selection {
            ctx.report_error(
                Rule::ScalarLeafs,
                vec![field.pos],
                format!(
                    "Field \"{name}\" of type \"{}\" must have a selection of subfields. Did you mean \"{name} {{ ... }}\"?",
                    definition.ty
                ),
            );
        }
    }
}
