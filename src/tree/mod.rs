mod builder;
mod error;
mod node;
mod optimizer;
mod render;

use std::collections::BTreeMap;

pub use builder::{BuildOptions, build};
pub use error::{TreeError, TreeResult};
pub use node::{
    ChildrenNodeCollection, DepthMatcher, MatchedRouteData, MatchedRouteDataMap, NodeContents,
    RouteTreeNode,
};
pub use optimizer::{OptimizeStats, optimize, optimize_with_stats};

/// Build-time route tree: a root leaf for zero-segment routes plus one
/// subtree per segment count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTree {
    pub(crate) root: Option<MatchedRouteDataMap>,
    pub(crate) buckets: BTreeMap<usize, ChildrenNodeCollection>,
}

impl RouteTree {
    pub fn root(&self) -> Option<&MatchedRouteDataMap> {
        self.root.as_ref()
    }

    pub fn buckets(&self) -> &BTreeMap<usize, ChildrenNodeCollection> {
        &self.buckets
    }

    pub fn bucket(&self, segment_count: usize) -> Option<&ChildrenNodeCollection> {
        self.buckets.get(&segment_count)
    }

    pub fn node_count(&self) -> usize {
        self.buckets.values().map(ChildrenNodeCollection::node_count).sum()
    }

    /// Number of leaf entries, root included.
    pub fn route_count(&self) -> usize {
        fn count(children: &ChildrenNodeCollection) -> usize {
            children
                .iter()
                .map(|node| match node.contents() {
                    NodeContents::Children(c) => count(c),
                    NodeContents::Leaf(leaf) => leaf.len(),
                })
                .sum()
        }
        self.root.as_ref().map_or(0, MatchedRouteDataMap::len)
            + self.buckets.values().map(count).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.buckets.is_empty()
    }
}
