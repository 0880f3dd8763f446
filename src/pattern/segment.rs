use regex::Regex;
use smallvec::SmallVec;

/// One `/`-delimited component of a parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static { text: String },
    Parameter(ParamSegment),
}

impl Segment {
    pub fn is_static(&self) -> bool {
        matches!(self, Segment::Static { .. })
    }

    pub fn param_names(&self) -> &[String] {
        match self {
            Segment::Static { .. } => &[],
            Segment::Parameter(param) => &param.names,
        }
    }
}

/// A component holding one or more `{param}` tokens, compiled into a single
/// anchored regex with one capture group per parameter.
#[derive(Debug, Clone)]
pub struct ParamSegment {
    pub names: SmallVec<[String; 2]>,
    pub source: String,
    pub regex: Regex,
    // capture group index of names[i] inside `regex`
    pub group_indices: SmallVec<[usize; 2]>,
}

impl ParamSegment {
    pub fn new(
        names: SmallVec<[String; 2]>,
        source: String,
        regex: Regex,
        group_indices: SmallVec<[usize; 2]>,
    ) -> Self {
        debug_assert_eq!(names.len(), group_indices.len());
        Self {
            names,
            source,
            regex,
            group_indices,
        }
    }
}

impl PartialEq for ParamSegment {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.names == other.names
    }
}

impl Eq for ParamSegment {}
