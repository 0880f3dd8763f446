use hashbrown::HashSet;
use smallvec::SmallVec;
use std::collections::HashMap;

use super::lexer::{Fragment, lex_component};
use super::{
    DEFAULT_PARAM_PATTERN, ParamSegment, PatternError, PatternResult, Segment, compile_segment_regex,
};

/// Parses a route pattern using the default parameter regex.
pub fn parse_pattern_default(
    pattern: &str,
    constraints: &HashMap<String, String>,
) -> PatternResult<Vec<Segment>> {
    parse_pattern(pattern, constraints, DEFAULT_PARAM_PATTERN)
}

/// Turns a route pattern into one [`Segment`] per `/`-delimited component.
///
/// `""` and `"/"` are the root pattern and yield no segments. Inline
/// constraints (`{id:\d+}`) win over `constraints`, which win over
/// `default_param_pattern`.
#[tracing::instrument(level = "trace", skip(constraints, default_param_pattern), fields(pattern=%pattern))]
pub fn parse_pattern(
    pattern: &str,
    constraints: &HashMap<String, String>,
    default_param_pattern: &str,
) -> PatternResult<Vec<Segment>> {
    if pattern.is_empty() || pattern == "/" {
        return Ok(Vec::new());
    }

    let Some(body) = pattern.strip_prefix('/') else {
        return Err(PatternError::MissingLeadingSlash {
            pattern: pattern.to_string(),
        });
    };

    let mut segments = Vec::with_capacity(body.split('/').count());
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut offset = 1usize;

    for component in body.split('/') {
        let fragments = lex_component(pattern, component, offset)?;
        offset += component.len() + 1;

        let has_param = fragments
            .iter()
            .any(|f| matches!(f, Fragment::Param { .. }));
        if !has_param {
            segments.push(Segment::Static {
                text: component.to_string(),
            });
            continue;
        }

        for fragment in fragments.iter() {
            if let Fragment::Param { name, .. } = fragment
                && !seen_names.insert(name.clone())
            {
                return Err(PatternError::DuplicateParameter {
                    pattern: pattern.to_string(),
                    name: name.clone(),
                });
            }
        }

        segments.push(Segment::Parameter(build_param_segment(
            pattern,
            &fragments,
            constraints,
            default_param_pattern,
        )?));
    }

    Ok(segments)
}

fn build_param_segment(
    pattern: &str,
    fragments: &[Fragment],
    constraints: &HashMap<String, String>,
    default_param_pattern: &str,
) -> PatternResult<ParamSegment> {
    let mut source = String::from("^");
    let mut names: SmallVec<[String; 2]> = SmallVec::new();
    let mut group_indices: SmallVec<[usize; 2]> = SmallVec::new();
    let mut next_group = 1usize;

    for fragment in fragments {
        match fragment {
            Fragment::Literal(text) => source.push_str(&regex::escape(text)),
            Fragment::Param { name, inline } => {
                let resolved = inline
                    .as_deref()
                    .or_else(|| constraints.get(name).map(String::as_str))
                    .unwrap_or(default_param_pattern);

                // inner groups of a user constraint shift the numbering of later parameters
                let inner =
                    compile_segment_regex(resolved).map_err(|err| invalid_regex(pattern, name, err))?;

                source.push('(');
                source.push_str(resolved);
                source.push(')');
                names.push(name.clone());
                group_indices.push(next_group);
                next_group += inner.captures_len();
            }
        }
    }
    source.push('$');

    let regex = compile_segment_regex(&source).map_err(|err| {
        let name = names.first().map(String::as_str).unwrap_or_default();
        invalid_regex(pattern, name, err)
    })?;

    Ok(ParamSegment::new(names, source, regex, group_indices))
}

fn invalid_regex(pattern: &str, name: &str, err: regex::Error) -> PatternError {
    PatternError::InvalidRegex {
        pattern: pattern.to_string(),
        name: name.to_string(),
        error: err.to_string(),
    }
}
