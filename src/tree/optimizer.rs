use hashbrown::HashMap as FastHashMap;
use smallvec::SmallVec;
use tracing::{Level, event};

use super::{ChildrenNodeCollection, DepthMatcher, MatchedRouteDataMap, NodeContents, RouteTree, RouteTreeNode};
use crate::matcher::{MatcherKey, SegmentMatcher};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    /// Sibling nodes folded into an equivalent sibling.
    pub merged: usize,
    /// Single-child links absorbed into their parent.
    pub compressed: usize,
}

pub fn optimize(tree: RouteTree) -> RouteTree {
    optimize_with_stats(tree).0
}

/// Merges equivalent siblings, compresses single-child chains and orders
/// children static-first. Resolution results are unchanged and a second
/// pass returns an identical tree.
#[tracing::instrument(level = "debug", skip_all)]
pub fn optimize_with_stats(tree: RouteTree) -> (RouteTree, OptimizeStats) {
    let mut stats = OptimizeStats::default();
    let RouteTree { root, buckets } = tree;

    let buckets = buckets
        .into_iter()
        .map(|(count, children)| (count, optimize_nodes(children.into_nodes(), &mut stats)))
        .collect();

    event!(
        Level::DEBUG,
        merged = stats.merged,
        compressed = stats.compressed,
        "route tree optimized"
    );
    (RouteTree { root, buckets }, stats)
}

enum Pending {
    Children(Vec<RouteTreeNode>),
    Leaf(MatchedRouteDataMap),
}

impl Pending {
    fn from_contents(contents: NodeContents) -> Self {
        match contents {
            NodeContents::Children(children) => Pending::Children(children.into_nodes()),
            NodeContents::Leaf(leaf) => Pending::Leaf(leaf),
        }
    }

    fn same_kind(&self, contents: &NodeContents) -> bool {
        matches!(
            (self, contents),
            (Pending::Children(_), NodeContents::Children(_)) | (Pending::Leaf(_), NodeContents::Leaf(_))
        )
    }

    fn absorb(&mut self, contents: NodeContents) {
        match (self, contents) {
            (Pending::Children(nodes), NodeContents::Children(children)) => {
                nodes.extend(children.into_nodes())
            }
            (Pending::Leaf(leaf), NodeContents::Leaf(other)) => leaf.absorb(other),
            _ => {}
        }
    }
}

fn optimize_nodes(nodes: Vec<RouteTreeNode>, stats: &mut OptimizeStats) -> ChildrenNodeCollection {
    let mut groups: Vec<(usize, SegmentMatcher, Pending)> = Vec::with_capacity(nodes.len());
    let mut index: FastHashMap<MatcherKey, usize> = FastHashMap::with_capacity(nodes.len());

    for node in nodes {
        let Some((depth, matcher, contents)) = split_head(node) else {
            continue;
        };
        let key = matcher.key();
        if let Some(&i) = index.get(&key)
            && groups[i].2.same_kind(&contents)
        {
            let group = &mut groups[i];
            group.1.merge_names(&matcher);
            group.2.absorb(contents);
            stats.merged += 1;
            continue;
        }
        index.entry(key).or_insert(groups.len());
        groups.push((depth, matcher, Pending::from_contents(contents)));
    }

    let mut out: Vec<RouteTreeNode> = Vec::with_capacity(groups.len());
    for (depth, matcher, pending) in groups {
        let mut matchers: SmallVec<[DepthMatcher; 1]> = SmallVec::new();
        matchers.push((depth, matcher));

        let contents = match pending {
            Pending::Leaf(leaf) => NodeContents::Leaf(leaf),
            Pending::Children(children) => {
                let mut children = optimize_nodes(children, stats).into_nodes();
                if children.len() == 1
                    && let Some(only) = children.pop()
                {
                    let (tail, contents) = only.into_parts();
                    matchers.extend(tail);
                    stats.compressed += 1;
                    contents
                } else {
                    NodeContents::Children(ChildrenNodeCollection::from_nodes(children))
                }
            }
        };
        out.push(RouteTreeNode::from_parts(matchers, contents));
    }

    // stable: registration order survives inside each class
    out.sort_by_key(|node| !node.is_static());
    ChildrenNodeCollection::from_nodes(out)
}

/// Detaches a node's first matcher. A compressed chain is re-expanded so the
/// remaining matchers hang below as a single child.
fn split_head(node: RouteTreeNode) -> Option<(usize, SegmentMatcher, NodeContents)> {
    let (matchers, contents) = node.into_parts();
    let mut iter = matchers.into_iter();
    let (depth, head) = iter.next()?;
    let tail: SmallVec<[DepthMatcher; 1]> = iter.collect();
    if tail.is_empty() {
        return Some((depth, head, contents));
    }
    let child = RouteTreeNode::from_parts(tail, contents);
    Some((depth, head, NodeContents::Children(ChildrenNodeCollection::from_nodes(vec![child]))))
}
