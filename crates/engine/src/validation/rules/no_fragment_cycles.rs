use std::collections::{HashMap, HashSet};

use async_graphql_parser::{
    types::{ExecutableDocument, FragmentDefinition, FragmentSpread},
    Positioned,
};
use itertools::Itertools;

use crate::validation::{
    utils::fragment_spreads,
    visitor::{Rule, Visitor, VisitorContext},
};

/// Depth-first search over fragment spreads, reporting every cycle once.
#[derive(Default)]
pub(crate) struct NoFragmentCycles<'a> {
    visited: HashSet<&'a str>,
    spread_path: Vec<&'a Positioned<FragmentSpread>>,
    spread_path_index: HashMap<&'a str, usize>,
}

impl<'a> NoFragmentCycles<'a> {
    fn detect_cycles(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        name: &'a str,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        if !self.visited.insert(name) {
            return;
        }

        let spreads = fragment_spreads(&fragment.node.selection_set.node);
        if spreads.is_empty() {
            return;
        }

        self.spread_path_index.insert(name, self.spread_path.len());

        for spread in spreads {
            let spread_name = spread.node.fragment_name.node.as_str();
            self.spread_path.push(spread);

            match self.spread_path_index.get(spread_name).copied() {
                None => {
                    if let Some(target) = ctx.fragment(spread_name) {
                        self.detect_cycles(ctx, spread_name, target);
                    }
                }
                Some(index) => {
                    let cycle = &self.spread_path[index..];
                    let via = cycle[..cycle.len() - 1]
                        .iter()
                        .map(|spread| format!("\"{}\"", spread.node.fragment_name.node))
                        .join(", ");

                    let message = if via.is_empty() {
                        format!("Cannot spread fragment \"{spread_name}\" within itself.")
                    } else {
                        format!("Cannot spread fragment \"{spread_name}\" within itself via {via}.")
                    };

                    ctx.report_error(
                        Rule::NoFragmentCycles,
                        cycle.iter().map(|spread| spread.pos).collect(),
                        message,
                    );
                }
            }

            self.spread_path.pop();
        }

        self.spread_path_index.remove(name);
    }
}

impl<'a> Visitor<'a> for NoFragmentCycles<'a> {
    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a ExecutableDocument) {
        let mut fragments = doc.fragments.iter().collect::<Vec<_>>();
        fragments.sort_by_key(|(_, fragment)| (fragment.pos.line, fragment.pos.column));

        for (name, fragment) in fragments {
            self.detect_cycles(ctx, name.as_str(), fragment);
        }
    }
}
