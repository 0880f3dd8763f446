use hashbrown::HashMap as FastHashMap;
use smallvec::{SmallVec, smallvec};

use super::{TreeError, TreeResult};
use crate::enums::{HttpMethod, MethodSet};
use crate::matcher::{MatcherKey, SegmentMatcher};
use crate::types::RouteId;

/// `(depth, matcher)`; depth is the index of the path segment it tests.
pub type DepthMatcher = (usize, SegmentMatcher);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTreeNode {
    matchers: SmallVec<[DepthMatcher; 1]>,
    contents: NodeContents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContents {
    Children(ChildrenNodeCollection),
    Leaf(MatchedRouteDataMap),
}

impl RouteTreeNode {
    pub fn new<I>(matchers: I, contents: NodeContents) -> TreeResult<Self>
    where
        I: IntoIterator<Item = DepthMatcher>,
    {
        let matchers: SmallVec<[DepthMatcher; 1]> = matchers.into_iter().collect();
        if matchers.is_empty() {
            return Err(TreeError::EmptyMatcherSet);
        }
        for pair in matchers.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(TreeError::UnorderedMatchers {
                    previous: pair[0].0,
                    depth: pair[1].0,
                });
            }
        }
        Ok(Self { matchers, contents })
    }

    pub(crate) fn single(depth: usize, matcher: SegmentMatcher, contents: NodeContents) -> Self {
        Self {
            matchers: smallvec![(depth, matcher)],
            contents,
        }
    }

    pub fn matchers(&self) -> &[DepthMatcher] {
        &self.matchers
    }

    /// Matcher deciding which sibling this node is.
    pub fn first_matcher(&self) -> &SegmentMatcher {
        &self.matchers[0].1
    }

    pub fn depth(&self) -> usize {
        self.matchers[0].0
    }

    pub fn key(&self) -> MatcherKey {
        self.first_matcher().key()
    }

    pub fn is_static(&self) -> bool {
        self.first_matcher().is_static()
    }

    pub fn contents(&self) -> &NodeContents {
        &self.contents
    }

    pub fn contents_mut(&mut self) -> &mut NodeContents {
        &mut self.contents
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.contents, NodeContents::Leaf(_))
    }

    pub(crate) fn first_matcher_mut(&mut self) -> &mut SegmentMatcher {
        &mut self.matchers[0].1
    }

    pub(crate) fn into_parts(self) -> (SmallVec<[DepthMatcher; 1]>, NodeContents) {
        (self.matchers, self.contents)
    }

    pub(crate) fn from_parts(matchers: SmallVec<[DepthMatcher; 1]>, contents: NodeContents) -> Self {
        debug_assert!(!matchers.is_empty());
        Self { matchers, contents }
    }

    pub fn node_count(&self) -> usize {
        match &self.contents {
            NodeContents::Children(children) => 1 + children.node_count(),
            NodeContents::Leaf(_) => 1,
        }
    }
}

/// Children of one tree position, at most one per matcher identity.
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct ChildrenNodeCollection {
    nodes: Vec<RouteTreeNode>,
    index: FastHashMap<MatcherKey, usize>,
}

impl ChildrenNodeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node`, or returns it back when a sibling with the same identity
    /// already exists.
    pub fn insert(&mut self, node: RouteTreeNode) -> Result<(), RouteTreeNode> {
        let key = node.key();
        if self.index.contains_key(&key) {
            return Err(node);
        }
        self.index.insert(key, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Descends into the child for `matcher`, creating it when absent. An
    /// existing parameter child picks up the matcher's names.
    pub(crate) fn get_or_insert_with<F>(
        &mut self,
        depth: usize,
        matcher: SegmentMatcher,
        contents: F,
    ) -> &mut RouteTreeNode
    where
        F: FnOnce() -> NodeContents,
    {
        let key = matcher.key();
        if let Some(&i) = self.index.get(&key) {
            let node = &mut self.nodes[i];
            node.first_matcher_mut().merge_names(&matcher);
            return node;
        }
        let i = self.nodes.len();
        self.index.insert(key, i);
        self.nodes.push(RouteTreeNode::single(depth, matcher, contents()));
        &mut self.nodes[i]
    }

    pub fn get(&self, key: &MatcherKey) -> Option<&RouteTreeNode> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteTreeNode> {
        self.nodes.iter()
    }

    /// Static children first, then parameter children, each in insertion order.
    pub fn prioritized(&self) -> impl Iterator<Item = &RouteTreeNode> {
        self.nodes
            .iter()
            .filter(|n| n.is_static())
            .chain(self.nodes.iter().filter(|n| !n.is_static()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(RouteTreeNode::node_count).sum()
    }

    pub(crate) fn into_nodes(self) -> Vec<RouteTreeNode> {
        self.nodes
    }

    /// Rebuilds the index; the first node wins on a repeated identity.
    pub(crate) fn from_nodes(nodes: Vec<RouteTreeNode>) -> Self {
        let mut index = FastHashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.key()).or_insert(i);
        }
        Self { nodes, index }
    }
}

impl PartialEq for ChildrenNodeCollection {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for ChildrenNodeCollection {}

impl<'a> IntoIterator for &'a ChildrenNodeCollection {
    type Item = &'a RouteTreeNode;
    type IntoIter = std::slice::Iter<'a, RouteTreeNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRouteData {
    pub methods: MethodSet,
    /// Name of each captured value, in capture order.
    pub param_names: Vec<Box<str>>,
    pub route: RouteId,
    pub pattern: Box<str>,
}

/// Route entries that end at one leaf. Methods never overlap between entries
/// added through [`MatchedRouteDataMap::push`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchedRouteDataMap {
    entries: Vec<MatchedRouteData>,
}

impl MatchedRouteDataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: MatchedRouteData) -> TreeResult<()> {
        if let Some(existing) = self.entries.iter().find(|e| e.methods.intersects(entry.methods)) {
            let shared = existing.methods & entry.methods;
            return Err(TreeError::DuplicateRoute {
                method: shared.first().unwrap_or(HttpMethod::Get),
                pattern: entry.pattern.to_string(),
                existing: existing.route.to_string(),
                duplicate: entry.route.to_string(),
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Appends without the overlap check; earlier entries keep priority.
    pub(crate) fn absorb(&mut self, other: MatchedRouteDataMap) {
        self.entries.extend(other.entries);
    }

    pub fn find(&self, method: HttpMethod) -> Option<&MatchedRouteData> {
        self.entries.iter().find(|e| e.methods.has(method))
    }

    pub fn allowed(&self) -> MethodSet {
        self.entries
            .iter()
            .fold(MethodSet::empty(), |acc, e| acc | e.methods)
    }

    pub fn entries(&self) -> &[MatchedRouteData] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
