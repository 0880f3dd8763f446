use std::collections::BTreeMap;

use tracing::{Level, event};

use super::{
    ChildrenNodeCollection, MatchedRouteData, MatchedRouteDataMap, NodeContents, RouteTree,
    TreeResult,
};
use crate::matcher::SegmentMatcher;
use crate::pattern::{DEFAULT_PARAM_PATTERN, Segment, parse_pattern};
use crate::registry::Route;

/// Inputs of the build step that change the shape of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub default_param_pattern: String,
    /// Drops one trailing `/` from patterns so `/users/` and `/users` coincide.
    pub ignore_trailing_slash: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            default_param_pattern: DEFAULT_PARAM_PATTERN.to_string(),
            ignore_trailing_slash: false,
        }
    }
}

/// Grows one tree per segment count. Any pattern or duplicate error aborts
/// the whole build.
#[tracing::instrument(level = "debug", skip_all, fields(routes = routes.len()))]
pub fn build(routes: &[Route], options: &BuildOptions) -> TreeResult<RouteTree> {
    let mut root: Option<MatchedRouteDataMap> = None;
    let mut buckets: BTreeMap<usize, ChildrenNodeCollection> = BTreeMap::new();

    for route in routes {
        let pattern = effective_pattern(route.uri_pattern(), options.ignore_trailing_slash);
        let segments = parse_pattern(pattern, route.constraints(), &options.default_param_pattern)?;
        let entry = MatchedRouteData {
            methods: route.methods(),
            param_names: segments
                .iter()
                .flat_map(|s| s.param_names().iter().map(|n| n.as_str().into()))
                .collect(),
            route: route.identifier().clone(),
            pattern: route.uri_pattern().into(),
        };

        if segments.is_empty() {
            root.get_or_insert_with(MatchedRouteDataMap::new).push(entry)?;
            continue;
        }

        let bucket = buckets.entry(segments.len()).or_default();
        insert_route(bucket, &segments, entry)?;
    }

    let tree = RouteTree { root, buckets };
    event!(
        Level::DEBUG,
        routes = routes.len(),
        buckets = tree.buckets.len(),
        nodes = tree.node_count(),
        "route tree built"
    );
    Ok(tree)
}

fn effective_pattern(pattern: &str, ignore_trailing_slash: bool) -> &str {
    if ignore_trailing_slash && pattern.len() > 1 {
        pattern.strip_suffix('/').unwrap_or(pattern)
    } else {
        pattern
    }
}

fn insert_route(
    bucket: &mut ChildrenNodeCollection,
    segments: &[Segment],
    entry: MatchedRouteData,
) -> TreeResult<()> {
    let last = segments.len() - 1;
    let mut children = bucket;

    for (depth, segment) in segments.iter().enumerate() {
        let matcher = SegmentMatcher::from_segment(segment);
        let node = children.get_or_insert_with(depth, matcher, || {
            if depth == last {
                NodeContents::Leaf(MatchedRouteDataMap::new())
            } else {
                NodeContents::Children(ChildrenNodeCollection::new())
            }
        });

        // every route in a bucket has the same segment count, so a node's
        // kind is fixed by its depth
        children = match node.contents_mut() {
            NodeContents::Leaf(leaf) => return leaf.push(entry),
            NodeContents::Children(next) => next,
        };
    }

    unreachable!("segment walk ends on a leaf")
}
