use hashbrown::HashMap as FastHashMap;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt::Write;

use super::program::{DispatchProgram, ProgramEntry, ProgramLeaf, ProgramNext, ProgramTest};
use super::{CompileError, CompileResult};
use crate::enums::{HttpMethod, MethodSet};
use crate::matcher::{SegmentMatcher, captures_to_map, with_param_buffer};
use crate::path::SplitPath;
use crate::pattern::compile_segment_regex;
use crate::types::{ParamOffset, RouteParams};

/// Outcome of running a compiled program against one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    Found {
        entry: &'a ProgramEntry,
        params: RouteParams,
    },
    MethodNotAllowed(MethodSet),
    NotFound,
}

#[derive(Debug)]
struct RuntimeNode {
    tests: SmallVec<[(usize, SegmentMatcher); 2]>,
    next: ProgramNext,
}

#[derive(Debug)]
struct RuntimeBranch {
    depth: usize,
    statics: FastHashMap<Box<str>, u32>,
    params: Vec<u32>,
}

/// Executable dispatch artifact: a validated [`DispatchProgram`] with its
/// regexes compiled. Immutable and shared across threads.
#[derive(Debug)]
pub struct CompiledDispatcher {
    program: DispatchProgram,
    nodes: Vec<RuntimeNode>,
    branches: Vec<RuntimeBranch>,
    buckets: FastHashMap<usize, u32>,
}

impl CompiledDispatcher {
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = program.nodes.len()))]
    pub fn from_program(program: DispatchProgram) -> CompileResult<Self> {
        program.validate()?;

        let regexes = program
            .patterns
            .iter()
            .enumerate()
            .map(|(index, source)| {
                compile_segment_regex(source).map_err(|err| CompileError::InvalidRegex {
                    index,
                    pattern: source.clone(),
                    error: err.to_string(),
                })
            })
            .collect::<CompileResult<Vec<_>>>()?;

        let nodes = program
            .nodes
            .iter()
            .map(|node| RuntimeNode {
                tests: node
                    .tests
                    .iter()
                    .map(|test| lower_test(test, &program.patterns, &regexes))
                    .collect(),
                next: node.next,
            })
            .collect();

        let branches = program
            .branches
            .iter()
            .map(|branch| RuntimeBranch {
                depth: branch.depth as usize,
                statics: branch.statics.iter().cloned().collect(),
                params: branch.params.clone(),
            })
            .collect();

        let buckets = program
            .buckets
            .iter()
            .map(|b| (b.segment_count as usize, b.branch))
            .collect();

        Ok(Self {
            program,
            nodes,
            branches,
            buckets,
        })
    }

    pub fn program(&self) -> &DispatchProgram {
        &self.program
    }

    /// Runs the program. `method` is `None` for methods outside
    /// [`HttpMethod`], which can only ever yield `MethodNotAllowed`.
    #[tracing::instrument(level = "trace", skip(self, path), fields(segments = path.len()))]
    pub fn resolve(&self, method: Option<HttpMethod>, path: &SplitPath<'_>) -> Resolution<'_> {
        with_param_buffer(|buf| {
            let leaf = if path.is_empty() {
                self.program.root
            } else {
                self.buckets
                    .get(&path.len())
                    .and_then(|&branch| self.visit_branch(branch, path, buf))
            };

            let Some(leaf) = leaf.and_then(|l| self.program.leaves.get(l as usize)) else {
                return Resolution::NotFound;
            };
            self.finish(leaf, method, path, buf)
        })
    }

    fn finish<'s>(
        &'s self,
        leaf: &'s ProgramLeaf,
        method: Option<HttpMethod>,
        path: &SplitPath<'_>,
        captures: &[ParamOffset],
    ) -> Resolution<'s> {
        match method.and_then(|m| leaf.entry_for(m)) {
            Some(entry) => Resolution::Found {
                params: captures_to_map(path.path(), &entry.param_names, captures),
                entry,
            },
            None => Resolution::MethodNotAllowed(leaf.allowed),
        }
    }

    /// Static child first, then parameter children in order; captures made
    /// by a failed subtree are rolled back before the next sibling.
    fn visit_branch(&self, branch: u32, path: &SplitPath<'_>, buf: &mut Vec<ParamOffset>) -> Option<u32> {
        let branch = self.branches.get(branch as usize)?;
        let segment = path.segment(branch.depth)?;

        if let Some(&node) = branch.statics.get(segment) {
            let checkpoint = buf.len();
            if let Some(leaf) = self.visit_node(node, path, buf) {
                return Some(leaf);
            }
            buf.truncate(checkpoint);
        }

        for &node in &branch.params {
            let checkpoint = buf.len();
            if let Some(leaf) = self.visit_node(node, path, buf) {
                return Some(leaf);
            }
            buf.truncate(checkpoint);
        }
        None
    }

    fn visit_node(&self, node: u32, path: &SplitPath<'_>, buf: &mut Vec<ParamOffset>) -> Option<u32> {
        let node = self.nodes.get(node as usize)?;
        for (depth, matcher) in &node.tests {
            let segment = path.segment(*depth)?;
            let offset = path.offset(*depth)?;
            if !matcher.capture(segment, offset, buf) {
                return None;
            }
        }
        match node.next {
            ProgramNext::Leaf(leaf) => Some(leaf),
            ProgramNext::Branch(branch) => self.visit_branch(branch, path, buf),
        }
    }

    /// Nested-conditional listing of the program, for debugging.
    pub fn render(&self) -> String {
        let mut out = String::from("match segments.len() {\n");
        if let Some(root) = self.program.root {
            out.push_str("  0 => {\n");
            self.render_leaf(&mut out, root, 2);
            out.push_str("  }\n");
        }
        for bucket in &self.program.buckets {
            let _ = writeln!(out, "  {} => {{", bucket.segment_count);
            self.render_branch(&mut out, bucket.branch, 2);
            out.push_str("  }\n");
        }
        out.push_str("  _ => not_found,\n}\n");
        out
    }

    fn render_branch(&self, out: &mut String, branch: u32, level: usize) {
        let Some(branch) = self.program.branches.get(branch as usize) else {
            return;
        };
        let children = branch.statics.iter().map(|(_, n)| *n).chain(branch.params.iter().copied());
        for node in children {
            let Some(runtime) = self.nodes.get(node as usize) else {
                continue;
            };
            let condition = runtime
                .tests
                .iter()
                .map(|(depth, m)| m.condition_expr(&format!("segments[{depth}]")))
                .collect::<Vec<_>>()
                .join(" && ");
            let _ = writeln!(out, "{:indent$}if {condition} {{", "", indent = level * 2);
            for (depth, matcher) in &runtime.tests {
                if let Some(expr) = matcher.parameter_expr(&format!("segments[{depth}]")) {
                    let _ = writeln!(out, "{:indent$}capture {expr};", "", indent = (level + 1) * 2);
                }
            }
            match runtime.next {
                ProgramNext::Branch(b) => self.render_branch(out, b, level + 1),
                ProgramNext::Leaf(l) => self.render_leaf(out, l, level + 1),
            }
            let _ = writeln!(out, "{:indent$}}}", "", indent = level * 2);
        }
    }

    fn render_leaf(&self, out: &mut String, leaf: u32, level: usize) {
        let Some(leaf) = self.program.leaves.get(leaf as usize) else {
            return;
        };
        for entry in &leaf.entries {
            let names = entry.param_names.join(", ");
            let _ = writeln!(
                out,
                "{:indent$}[{}] => found({:?}, [{names}]);",
                "",
                entry.methods,
                entry.route.as_ref(),
                indent = level * 2
            );
        }
        let _ = writeln!(
            out,
            "{:indent$}_ => method_not_allowed([{}]);",
            "",
            leaf.allowed,
            indent = level * 2
        );
    }
}

fn lower_test(test: &ProgramTest, sources: &[String], regexes: &[Regex]) -> (usize, SegmentMatcher) {
    match test {
        ProgramTest::Static { depth, text } => (*depth as usize, SegmentMatcher::Static { text: text.clone() }),
        ProgramTest::Pattern {
            depth,
            pattern,
            groups,
        } => {
            // indices were checked by `validate`
            let index = *pattern as usize;
            (
                *depth as usize,
                SegmentMatcher::Parameter {
                    source: sources[index].as_str().into(),
                    regex: regexes[index].clone(),
                    names: SmallVec::new(),
                    group_indices: groups.iter().map(|&g| g as usize).collect(),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::path::{PathOptions, split_path};
    use crate::registry::Route;
    use crate::tree::{BuildOptions, build, optimize};

    fn dispatcher(routes: &[(HttpMethod, &str, &str)]) -> CompiledDispatcher {
        let routes: Vec<Route> = routes
            .iter()
            .map(|(m, p, id)| Route::new((*m).into(), *p, *id).unwrap())
            .collect();
        let program = compile(&optimize(build(&routes, &BuildOptions::default()).unwrap()));
        CompiledDispatcher::from_program(program).unwrap()
    }

    fn resolve_id(d: &CompiledDispatcher, method: HttpMethod, uri: &str) -> Option<String> {
        match d.resolve(Some(method), &split_path(uri, &PathOptions::default())) {
            Resolution::Found { entry, .. } => Some(entry.route.to_string()),
            _ => None,
        }
    }

    #[test]
    fn backtracks_from_static_dead_end_into_parameter() {
        let d = dispatcher(&[
            (HttpMethod::Get, "/users/new/edit", "new.edit"),
            (HttpMethod::Get, "/users/{id}/posts", "posts"),
        ]);
        let split = split_path("/users/new/posts", &PathOptions::default());
        match d.resolve(Some(HttpMethod::Get), &split) {
            Resolution::Found { entry, params } => {
                assert_eq!(entry.route.as_ref(), "posts");
                assert_eq!(params.get("id").map(String::as_str), Some("new"));
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn captures_from_failed_branch_do_not_leak() {
        let d = dispatcher(&[
            (HttpMethod::Get, "/{a:\\d+}/x", "digits"),
            (HttpMethod::Get, "/{b}/y", "any"),
        ]);
        let split = split_path("/12/y", &PathOptions::default());
        match d.resolve(Some(HttpMethod::Get), &split) {
            Resolution::Found { entry, params } => {
                assert_eq!(entry.route.as_ref(), "any");
                assert_eq!(params.len(), 1);
                assert_eq!(params.get("b").map(String::as_str), Some("12"));
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn unknown_method_is_never_found() {
        let d = dispatcher(&[(HttpMethod::Get, "/widgets", "list")]);
        let split = split_path("/widgets", &PathOptions::default());
        assert_eq!(d.resolve(None, &split), Resolution::MethodNotAllowed(MethodSet::GET));
        assert_eq!(resolve_id(&d, HttpMethod::Get, "/widgets").as_deref(), Some("list"));
    }

    #[test]
    fn corrupt_program_is_rejected() {
        let d = dispatcher(&[(HttpMethod::Get, "/a/{b}", "ab")]);
        let mut program = d.program().clone();
        program.buckets[0].branch = 99;
        assert!(matches!(
            CompiledDispatcher::from_program(program),
            Err(CompileError::CorruptProgram { .. })
        ));
    }

    #[test]
    fn stored_pattern_that_no_longer_compiles_is_rejected() {
        let d = dispatcher(&[(HttpMethod::Get, "/a/{b}", "ab")]);
        let mut program = d.program().clone();
        program.patterns[0] = "^([)$".to_string();
        assert!(matches!(
            CompiledDispatcher::from_program(program),
            Err(CompileError::InvalidRegex { index: 0, .. })
        ));
    }

    #[test]
    fn render_lists_static_before_parameter() {
        let d = dispatcher(&[
            (HttpMethod::Get, "/users/{id}", "show"),
            (HttpMethod::Get, "/users/new", "new"),
        ]);
        let text = d.render();
        let static_at = text.find("segments[1] == \"new\"").unwrap();
        let param_at = text.find("is_match(segments[1])").unwrap();
        assert!(static_at < param_at);
    }
}
