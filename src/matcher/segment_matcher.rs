use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::pattern::Segment;
use crate::tools::StableHasher;
use crate::types::ParamOffset;

/// Distinct names seen for one capture position after merging.
pub type ParamAliases = SmallVec<[Box<str>; 1]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatcherKind {
    Static,
    Parameter,
}

/// Identity of a matcher: kind plus literal text or regex source.
///
/// Hashing only feeds the precomputed stable hash; equality still compares
/// the source so a hash collision never merges two different matchers.
#[derive(Debug, Clone)]
pub struct MatcherKey {
    kind: MatcherKind,
    source: Box<str>,
    hash: u64,
}

impl MatcherKey {
    pub fn new(kind: MatcherKind, source: &str) -> Self {
        let mut hasher = StableHasher::new();
        hasher.write_u8(kind as u8);
        hasher.write_str(source);
        Self {
            kind,
            source: source.into(),
            hash: hasher.finish(),
        }
    }

    pub fn kind(&self) -> MatcherKind {
        self.kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn stable_hash(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for MatcherKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.kind == other.kind && self.source == other.source
    }
}

impl Eq for MatcherKey {}

impl Hash for MatcherKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Compiled, deduplicable test for one path segment.
#[derive(Debug, Clone)]
pub enum SegmentMatcher {
    Static {
        text: Box<str>,
    },
    Parameter {
        source: Box<str>,
        regex: Regex,
        names: SmallVec<[ParamAliases; 2]>,
        group_indices: SmallVec<[usize; 2]>,
    },
}

impl SegmentMatcher {
    pub fn from_segment(segment: &Segment) -> Self {
        match segment {
            Segment::Static { text } => SegmentMatcher::Static {
                text: text.as_str().into(),
            },
            Segment::Parameter(param) => SegmentMatcher::Parameter {
                source: param.source.as_str().into(),
                regex: param.regex.clone(),
                names: param
                    .names
                    .iter()
                    .map(|name| {
                        let mut aliases = ParamAliases::new();
                        aliases.push(name.as_str().into());
                        aliases
                    })
                    .collect(),
                group_indices: param.group_indices.clone(),
            },
        }
    }

    pub fn kind(&self) -> MatcherKind {
        match self {
            SegmentMatcher::Static { .. } => MatcherKind::Static,
            SegmentMatcher::Parameter { .. } => MatcherKind::Parameter,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, SegmentMatcher::Static { .. })
    }

    /// Literal text for static matchers, regex source for parameters.
    pub fn source(&self) -> &str {
        match self {
            SegmentMatcher::Static { text } => text,
            SegmentMatcher::Parameter { source, .. } => source,
        }
    }

    pub fn key(&self) -> MatcherKey {
        MatcherKey::new(self.kind(), self.source())
    }

    pub fn identity_hash(&self) -> u64 {
        self.key().stable_hash()
    }

    pub fn group_indices(&self) -> &[usize] {
        match self {
            SegmentMatcher::Static { .. } => &[],
            SegmentMatcher::Parameter { group_indices, .. } => group_indices,
        }
    }

    pub fn aliases(&self) -> &[ParamAliases] {
        match self {
            SegmentMatcher::Static { .. } => &[],
            SegmentMatcher::Parameter { names, .. } => names,
        }
    }

    /// Names joined per position, e.g. `id|user_id,slug`.
    pub fn alias_signature(&self) -> String {
        self.aliases()
            .iter()
            .map(|aliases| aliases.join("|"))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn matches(&self, segment: &str) -> bool {
        match self {
            SegmentMatcher::Static { text } => text.as_ref() == segment,
            SegmentMatcher::Parameter { regex, .. } => regex.is_match(segment),
        }
    }

    /// Tests `segment` and, on success, pushes the absolute `(start, len)` of
    /// every parameter capture. `offset` is the segment's start in the URI.
    #[inline]
    pub fn capture(&self, segment: &str, offset: usize, out: &mut Vec<ParamOffset>) -> bool {
        match self {
            SegmentMatcher::Static { text } => text.as_ref() == segment,
            SegmentMatcher::Parameter {
                regex,
                group_indices,
                ..
            } => {
                let Some(caps) = regex.captures(segment) else {
                    return false;
                };
                for &group in group_indices.iter() {
                    match caps.get(group) {
                        Some(m) => out.push((offset + m.start(), m.len())),
                        None => out.push((offset, 0)),
                    }
                }
                true
            }
        }
    }

    /// Unions parameter names positionally. Only meaningful for two
    /// parameter matchers with the same key; anything else is left as is.
    pub fn merge_names(&mut self, other: &SegmentMatcher) {
        if let (
            SegmentMatcher::Parameter { names, .. },
            SegmentMatcher::Parameter {
                names: other_names, ..
            },
        ) = (self, other)
        {
            for (mine, theirs) in names.iter_mut().zip(other_names.iter()) {
                for alias in theirs.iter() {
                    if !mine.contains(alias) {
                        mine.push(alias.clone());
                    }
                }
            }
        }
    }

    /// Condition expression over `segment`, as emitted into the rendered
    /// dispatch source.
    pub fn condition_expr(&self, segment: &str) -> String {
        match self {
            SegmentMatcher::Static { text } => format!("{segment} == {text:?}"),
            SegmentMatcher::Parameter { source, .. } => {
                format!("regex({source:?}).is_match({segment})")
            }
        }
    }

    /// Parameter extraction expression over `segment`; `None` for statics.
    pub fn parameter_expr(&self, segment: &str) -> Option<String> {
        match self {
            SegmentMatcher::Static { .. } => None,
            SegmentMatcher::Parameter {
                source,
                group_indices,
                ..
            } => {
                let groups = group_indices
                    .iter()
                    .map(|g| g.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!("captures({source:?}, {segment})[{groups}]"))
            }
        }
    }
}

impl PartialEq for SegmentMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.source() == other.source()
            && self.aliases() == other.aliases()
    }
}

impl Eq for SegmentMatcher {}

impl fmt::Display for SegmentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentMatcher::Static { text } => write!(f, "{text}"),
            SegmentMatcher::Parameter { source, .. } => {
                write!(f, "{{{}}}~{source}", self.alias_signature())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern_default;
    use std::collections::HashMap;

    fn matcher_for(pattern: &str, index: usize) -> SegmentMatcher {
        let segments = parse_pattern_default(pattern, &HashMap::new()).expect("pattern should parse");
        SegmentMatcher::from_segment(&segments[index])
    }

    #[test]
    fn parameters_with_same_regex_share_identity() {
        let a = matcher_for("/users/{id}", 1);
        let b = matcher_for("/users/{user_id}", 1);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.identity_hash(), b.identity_hash());
    }

    #[test]
    fn static_and_parameter_never_share_identity() {
        let a = SegmentMatcher::Static {
            text: "^([^/]+)$".into(),
        };
        let b = matcher_for("/{id}", 0);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn merge_names_unions_positionally() {
        let mut a = matcher_for("/{a}-{b}", 0);
        let b = matcher_for("/{x}-{b}", 0);
        a.merge_names(&b);
        assert_eq!(a.alias_signature(), "a|x,b");
    }

    #[test]
    fn codegen_hooks_render_condition_and_extraction() {
        let s = matcher_for("/users", 0);
        assert_eq!(s.condition_expr("segments[0]"), "segments[0] == \"users\"");
        assert_eq!(s.parameter_expr("segments[0]"), None);

        let p = matcher_for("/{id:\\d+}", 0);
        assert_eq!(
            p.parameter_expr("segments[0]").as_deref(),
            Some("captures(\"^(\\\\d+)$\", segments[0])[1]")
        );
        assert!(p.matches("17"));
        assert!(!p.matches("x"));
    }

    #[test]
    fn capture_pushes_absolute_offsets() {
        let m = matcher_for("/{name}.{ext}", 0);
        let mut out = Vec::new();
        assert!(m.capture("report.pdf", 5, &mut out));
        assert_eq!(out, vec![(5, 6), (12, 3)]);

        out.clear();
        assert!(!m.capture("report", 5, &mut out));
        assert!(out.is_empty());
    }
}
