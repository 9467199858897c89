use fnv::{FnvHashMap, FnvHashSet};

use crate::{
    ast::{Fragment, FragmentSpread},
    span::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct NoFragmentCycles<'a> {
    visited_fragments: FnvHashSet<&'a str>,
    spread_path: Vec<&'a Spanning<FragmentSpread<'a>>>,
    spread_path_index_by_name: FnvHashMap<&'a str, usize>,
}

pub fn factory<'a>() -> NoFragmentCycles<'a> {
    NoFragmentCycles {
        visited_fragments: FnvHashSet::default(),
        spread_path: Vec::new(),
        spread_path_index_by_name: FnvHashMap::default(),
    }
}

impl<'a> Visitor<'a> for NoFragmentCycles<'a> {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        if !self.visited_fragments.contains(fragment.item.name.item) {
            self.detect_cycle_from(ctx, fragment);
        }
    }
}

impl<'a> NoFragmentCycles<'a> {
    /// Depth-first search through the spread graph, reporting each cycle
    /// once at the spread that closes it.
    fn detect_cycle_from(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment<'a>>,
    ) {
        let fragment_name = fragment.item.name.item;
        self.visited_fragments.insert(fragment_name);

        let spreads = ctx.fragment_spreads(&fragment.item.selection_set);
        if spreads.is_empty() {
            return;
        }

        self.spread_path_index_by_name
            .insert(fragment_name, self.spread_path.len());

        for spread in spreads.iter() {
            let spread_name = spread.item.name.item;
            match self.spread_path_index_by_name.get(spread_name).copied() {
                Some(cycle_index) => {
                    let cycle_path = &self.spread_path[cycle_index..];
                    let via: Vec<&str> = cycle_path.iter().map(|s| s.item.name.item).collect();
                    let mut locations: Vec<_> =
                        cycle_path.iter().map(|s| s.start()).collect();
                    locations.push(spread.start());
                    ctx.report_error(&error_message(spread_name, &via), &locations);
                }
                None => {
                    self.spread_path.push(spread);
                    if !self.visited_fragments.contains(spread_name)
                        && let Some(next) = ctx.fragment_by_name(spread_name)
                    {
                        self.detect_cycle_from(ctx, next);
                    }
                    self.spread_path.pop();
                }
            }
        }

        self.spread_path_index_by_name.remove(fragment_name);
    }
}

fn error_message(fragment_name: &str, via: &[&str]) -> String {
    if via.is_empty() {
        format!("Cannot spread fragment \"{fragment_name}\" within itself.")
    } else {
        let path = via
            .iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Cannot spread fragment \"{fragment_name}\" within itself via {path}.")
    }
}
