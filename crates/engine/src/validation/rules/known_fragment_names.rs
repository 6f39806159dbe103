use async_graphql_parser::{types::FragmentSpread, Positioned};

use crate::validation::visitor::{Rule, Visitor, VisitorContext};

pub(crate) struct KnownFragmentNames;

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(&mut self, ctx: &mut VisitorContext<'a>, spread: &'a Positioned<FragmentSpread>) {
        let name = &spread.node.fragment_name;
        if ctx.fragment(&name.node).is_none() {
            ctx.report_error(
                Rule::KnownFragmentNames,
                vec![name.pos],
                format!("Unknown fragment \"{}\".", name.node),
            );
        }
    }
}
