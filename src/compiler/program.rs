use serde::{Deserialize, Serialize};

use super::{CompileError, CompileResult};
use crate::enums::{HTTP_METHOD_COUNT, HttpMethod, MethodSet};
use crate::types::RouteId;

/// Bumped whenever the serialized layout changes.
pub const PROGRAM_FORMAT_VERSION: u32 = 1;

/// Flat, index-addressed form of an optimized route tree. This is what gets
/// persisted; [`super::CompiledDispatcher`] executes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchProgram {
    pub version: u32,
    /// Anchored regex sources, referenced by [`ProgramTest::Pattern`].
    pub patterns: Vec<String>,
    pub nodes: Vec<ProgramNode>,
    pub branches: Vec<ProgramBranch>,
    pub leaves: Vec<ProgramLeaf>,
    /// Leaf for zero-segment paths.
    pub root: Option<u32>,
    /// Sorted by segment count.
    pub buckets: Vec<ProgramBucket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramBucket {
    pub segment_count: u32,
    pub branch: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramNode {
    /// Every test must pass, in order, before `next` is entered.
    pub tests: Vec<ProgramTest>,
    pub next: ProgramNext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgramTest {
    Static { depth: u32, text: Box<str> },
    Pattern { depth: u32, pattern: u32, groups: Vec<u32> },
}

impl ProgramTest {
    pub fn depth(&self) -> u32 {
        match self {
            ProgramTest::Static { depth, .. } | ProgramTest::Pattern { depth, .. } => *depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum ProgramNext {
    Branch(u32),
    Leaf(u32),
}

/// Children of one position. Static children are keyed by their literal so
/// the runtime can look them up directly; parameter children are tried in
/// order afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramBranch {
    pub depth: u32,
    pub statics: Vec<(Box<str>, u32)>,
    pub params: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramLeaf {
    pub entries: Vec<ProgramEntry>,
    /// Entry index + 1 per method; 0 means the method is not registered.
    pub routes: [u32; HTTP_METHOD_COUNT],
    pub allowed: MethodSet,
}

impl ProgramLeaf {
    pub fn entry_for(&self, method: HttpMethod) -> Option<&ProgramEntry> {
        match self.routes[method.index()] {
            0 => None,
            n => self.entries.get(n as usize - 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub route: RouteId,
    pub methods: MethodSet,
    pub param_names: Vec<Box<str>>,
}

impl DispatchProgram {
    pub fn to_json(&self) -> CompileResult<String> {
        serde_json::to_string(self).map_err(|err| CompileError::Encode(err.to_string()))
    }

    pub fn from_json(data: &str) -> CompileResult<Self> {
        let program: DispatchProgram =
            serde_json::from_str(data).map_err(|err| CompileError::Decode(err.to_string()))?;
        if program.version != PROGRAM_FORMAT_VERSION {
            return Err(CompileError::VersionMismatch {
                found: program.version,
                expected: PROGRAM_FORMAT_VERSION,
            });
        }
        Ok(program)
    }

    /// Checks every index the runtime will follow.
    pub fn validate(&self) -> CompileResult<()> {
        fn corrupt(detail: String) -> CompileResult<()> {
            Err(CompileError::CorruptProgram { detail })
        }

        if let Some(root) = self.root
            && root as usize >= self.leaves.len()
        {
            return corrupt(format!("root leaf {root} out of range"));
        }
        for bucket in &self.buckets {
            if bucket.branch as usize >= self.branches.len() {
                return corrupt(format!(
                    "bucket {} points at missing branch {}",
                    bucket.segment_count, bucket.branch
                ));
            }
        }
        for (i, branch) in self.branches.iter().enumerate() {
            let children = branch.statics.iter().map(|(_, n)| *n).chain(branch.params.iter().copied());
            for node in children {
                if node as usize >= self.nodes.len() {
                    return corrupt(format!("branch {i} points at missing node {node}"));
                }
            }
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if node.tests.is_empty() {
                return corrupt(format!("node {i} has no tests"));
            }
            for test in &node.tests {
                if let ProgramTest::Pattern { pattern, .. } = test
                    && *pattern as usize >= self.patterns.len()
                {
                    return corrupt(format!("node {i} references missing pattern {pattern}"));
                }
            }
            if node.tests.windows(2).any(|w| w[1].depth() <= w[0].depth()) {
                return corrupt(format!("node {i} tests are not ordered by depth"));
            }
            let last_depth = node.tests.last().map_or(0, ProgramTest::depth);
            // depth must grow along every edge, which also rules out cycles
            let valid = match node.next {
                ProgramNext::Branch(b) => self
                    .branches
                    .get(b as usize)
                    .is_some_and(|branch| branch.depth > last_depth),
                ProgramNext::Leaf(l) => (l as usize) < self.leaves.len(),
            };
            if !valid {
                return corrupt(format!("node {i} continues to an invalid target"));
            }
        }
        for (i, branch) in self.branches.iter().enumerate() {
            let children = branch.statics.iter().map(|(_, n)| *n).chain(branch.params.iter().copied());
            for node in children {
                let first = self.nodes[node as usize].tests.first().map(ProgramTest::depth);
                if first != Some(branch.depth) {
                    return corrupt(format!("branch {i} child {node} starts at the wrong depth"));
                }
            }
        }
        for (i, leaf) in self.leaves.iter().enumerate() {
            if leaf.routes.iter().any(|&r| r as usize > leaf.entries.len()) {
                return corrupt(format!("leaf {i} method table points past its entries"));
            }
        }
        Ok(())
    }
}
