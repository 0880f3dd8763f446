use hashbrown::HashMap as FastHashMap;
use tracing::{Level, event};

use super::program::{
    DispatchProgram, PROGRAM_FORMAT_VERSION, ProgramBranch, ProgramBucket, ProgramEntry,
    ProgramLeaf, ProgramNext, ProgramNode, ProgramTest,
};
use crate::enums::{HTTP_METHOD_COUNT, MethodSet};
use crate::matcher::SegmentMatcher;
use crate::tree::{ChildrenNodeCollection, MatchedRouteDataMap, NodeContents, RouteTree, RouteTreeNode};

/// Lowers a route tree into a [`DispatchProgram`]. Infallible: every pattern
/// was validated when the tree was built.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile(tree: &RouteTree) -> DispatchProgram {
    let mut emitter = Emitter::default();

    let root = tree.root().map(|leaf| emitter.leaf(leaf));
    let buckets = tree
        .buckets()
        .iter()
        .map(|(&count, children)| ProgramBucket {
            segment_count: count as u32,
            branch: emitter.branch(0, children),
        })
        .collect();

    let program = DispatchProgram {
        version: PROGRAM_FORMAT_VERSION,
        patterns: emitter.patterns,
        nodes: emitter.nodes,
        branches: emitter.branches,
        leaves: emitter.leaves,
        root,
        buckets,
    };
    event!(
        Level::DEBUG,
        nodes = program.nodes.len(),
        branches = program.branches.len(),
        leaves = program.leaves.len(),
        patterns = program.patterns.len(),
        "dispatch program compiled"
    );
    program
}

#[derive(Default)]
struct Emitter {
    patterns: Vec<String>,
    pattern_ids: FastHashMap<String, u32>,
    nodes: Vec<ProgramNode>,
    branches: Vec<ProgramBranch>,
    leaves: Vec<ProgramLeaf>,
}

impl Emitter {
    fn pattern(&mut self, source: &str) -> u32 {
        if let Some(&id) = self.pattern_ids.get(source) {
            return id;
        }
        let id = self.patterns.len() as u32;
        self.patterns.push(source.to_string());
        self.pattern_ids.insert(source.to_string(), id);
        id
    }

    fn branch(&mut self, depth: usize, children: &ChildrenNodeCollection) -> u32 {
        // reserve the slot first so parents get lower indices than children
        let id = self.branches.len() as u32;
        self.branches.push(ProgramBranch {
            depth: children.iter().next().map_or(depth, RouteTreeNode::depth) as u32,
            statics: Vec::new(),
            params: Vec::new(),
        });

        let mut statics = Vec::new();
        let mut params = Vec::new();
        for child in children.prioritized() {
            let node = self.node(child);
            match child.first_matcher() {
                SegmentMatcher::Static { text } => statics.push((text.clone(), node)),
                SegmentMatcher::Parameter { .. } => params.push(node),
            }
        }

        let branch = &mut self.branches[id as usize];
        branch.statics = statics;
        branch.params = params;
        id
    }

    fn node(&mut self, node: &RouteTreeNode) -> u32 {
        let tests: Vec<ProgramTest> = node
            .matchers()
            .iter()
            .map(|(depth, matcher)| match matcher {
                SegmentMatcher::Static { text } => ProgramTest::Static {
                    depth: *depth as u32,
                    text: text.clone(),
                },
                SegmentMatcher::Parameter { source, .. } => ProgramTest::Pattern {
                    depth: *depth as u32,
                    pattern: self.pattern(source),
                    groups: matcher.group_indices().iter().map(|&g| g as u32).collect(),
                },
            })
            .collect();

        let next_depth = node.matchers().last().map_or(0, |(d, _)| d + 1);
        let next = match node.contents() {
            NodeContents::Children(children) => ProgramNext::Branch(self.branch(next_depth, children)),
            NodeContents::Leaf(leaf) => ProgramNext::Leaf(self.leaf(leaf)),
        };

        let id = self.nodes.len() as u32;
        self.nodes.push(ProgramNode { tests, next });
        id
    }

    fn leaf(&mut self, leaf: &MatchedRouteDataMap) -> u32 {
        let mut routes = [0u32; HTTP_METHOD_COUNT];
        let mut allowed = MethodSet::empty();
        let entries: Vec<ProgramEntry> = leaf
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                for method in entry.methods.methods() {
                    let slot = &mut routes[method.index()];
                    if *slot == 0 {
                        *slot = i as u32 + 1;
                    }
                }
                allowed |= entry.methods;
                ProgramEntry {
                    route: entry.route.clone(),
                    methods: entry.methods,
                    param_names: entry.param_names.clone(),
                }
            })
            .collect();

        let id = self.leaves.len() as u32;
        self.leaves.push(ProgramLeaf {
            entries,
            routes,
            allowed,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::HttpMethod;
    use crate::registry::Route;
    use crate::tree::{BuildOptions, build, optimize};

    fn program_of(routes: &[(HttpMethod, &str, &str)]) -> DispatchProgram {
        let routes: Vec<Route> = routes
            .iter()
            .map(|(m, p, id)| Route::new((*m).into(), *p, *id).unwrap())
            .collect();
        compile(&optimize(build(&routes, &BuildOptions::default()).unwrap()))
    }

    #[test]
    fn compiled_program_passes_validation() {
        let program = program_of(&[
            (HttpMethod::Get, "/", "root"),
            (HttpMethod::Get, "/users/{id}", "show"),
            (HttpMethod::Get, "/users/new", "new"),
            (HttpMethod::Post, "/users", "create"),
            (HttpMethod::Get, "/files/{name}.{ext}", "file"),
        ]);
        program.validate().unwrap();
        assert!(program.root.is_some());
        assert_eq!(
            program.buckets.iter().map(|b| b.segment_count).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn identical_regex_sources_share_a_pattern_slot() {
        let program = program_of(&[
            (HttpMethod::Get, "/a/{x}", "a"),
            (HttpMethod::Get, "/b/{y}", "b"),
        ]);
        assert_eq!(program.patterns, vec!["^([^/]+)$".to_string()]);
    }

    #[test]
    fn leaf_method_table_points_at_entries() {
        let program = program_of(&[
            (HttpMethod::Get, "/widgets", "list"),
            (HttpMethod::Post, "/widgets", "create"),
        ]);
        let leaf = &program.leaves[0];
        assert_eq!(leaf.allowed, MethodSet::GET | MethodSet::POST);
        assert_eq!(leaf.entry_for(HttpMethod::Post).map(|e| e.route.as_ref()), Some("create"));
        assert!(leaf.entry_for(HttpMethod::Delete).is_none());
    }

    #[test]
    fn json_round_trip_preserves_program() {
        let program = program_of(&[(HttpMethod::Get, "/users/{id:\\d+}", "show")]);
        let json = program.to_json().unwrap();
        assert_eq!(DispatchProgram::from_json(&json).unwrap(), program);
    }
}
