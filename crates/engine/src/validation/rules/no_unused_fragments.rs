use std::collections::HashSet;

use async_graphql_parser::types::ExecutableDocument;

use crate::validation::{
    utils::fragment_spreads,
    visitor::{Rule, Visitor, VisitorContext},
};

pub(crate) struct NoUnusedFragments;

impl<'a> Visitor<'a> for NoUnusedFragments {
    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {
        let mut reachable = HashSet::new();
        let mut stack = doc
            .operations
            .iter()
            .flat_map(|(_, operation)| fragment_spreads(&operation.node.selection_set.node))
            .map(|spread| spread.node.fragment_name.node.as_str())
            .collect::<Vec<_>>();

        while let Some(name) = stack.pop() {
            if !reachable.insert(name) {
                continue;
            }
            if let Some(fragment) = ctx.fragment(name) {
                stack.extend(
                    fragment_spreads(&fragment.node.selection_set.node)
                        .into_iter()
                        .map(|spread| spread.node.fragment_name.node.as_str()),
                );
            }
        }

        let mut unused = doc
            .fragments
            .iter()
            .filter(|(name, _)| !reachable.contains(name.as_str()))
            .collect::<Vec<_>>();
        unused.sort_by_key(|(_, fragment)| (fragment.pos.line, fragment.pos.column));

        for (name, fragment) in unused {
            ctx.report_error(
                Rule::NoUnusedFragments,
                vec![fragment.pos],
                format!("Fragment \"{name}\" is never used."),
            );
        }
    }
}
