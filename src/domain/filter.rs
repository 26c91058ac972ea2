//! Filtered, read-only projections of an outline.

use tracing::instrument;

use crate::domain::arena::{NodeId, Outline};
use crate::domain::record::Record;

/// Case-sensitive substring predicate. An empty needle matches every item.
pub fn contains(needle: &str) -> impl Fn(&str) -> bool + '_ {
    move |text| text.contains(needle)
}

impl Outline {
    /// Keeps an item if its own text matches or any descendant survived;
    /// everything else is pruned. Absent when nothing in the subtree matches.
    #[instrument(level = "debug", skip(self, predicate))]
    pub fn filter_subtree<P>(&self, id: NodeId, predicate: P) -> Option<Record>
    where
        P: Fn(&str) -> bool,
    {
        self.project(id, predicate)
    }

    /// Surviving top-level items in their original order.
    #[instrument(level = "debug", skip(self, predicate))]
    pub fn search<P>(&self, predicate: P) -> Vec<Record>
    where
        P: Fn(&str) -> bool,
    {
        self.top_level()
            .iter()
            .filter_map(|&id| self.project(id, &predicate))
            .collect()
    }
}
