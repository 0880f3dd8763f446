use smallvec::SmallVec;

use super::{PatternError, PatternResult};

/// One piece of a `/`-delimited pattern component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fragment {
    Literal(String),
    Param {
        name: String,
        inline: Option<String>,
    },
}

pub(crate) type Fragments = SmallVec<[Fragment; 3]>;

/// Scans one component of `pattern`. `offset` is the byte position of the
/// component inside the full pattern and is only used for error reporting.
#[tracing::instrument(level = "trace", skip(pattern), fields(component=%component, offset=offset as u64))]
pub(crate) fn lex_component(
    pattern: &str,
    component: &str,
    offset: usize,
) -> PatternResult<Fragments> {
    let mut out: Fragments = SmallVec::new();
    let mut literal = String::new();
    let mut name = String::new();
    let mut inline: Option<String> = None;
    let mut in_param = false;
    let mut param_start = 0usize;

    for (idx, ch) in component.char_indices() {
        match ch {
            '{' if in_param => {
                return Err(PatternError::NestedParameter {
                    pattern: pattern.to_string(),
                    name: name.clone(),
                    index: offset + idx,
                });
            }
            '{' => {
                if !literal.is_empty() {
                    out.push(Fragment::Literal(std::mem::take(&mut literal)));
                }
                in_param = true;
                param_start = offset + idx;
                name.clear();
                inline = None;
            }
            '}' if !in_param => {
                return Err(PatternError::UnexpectedClosingBrace {
                    pattern: pattern.to_string(),
                    index: offset + idx,
                });
            }
            '}' => {
                validate_name(pattern, &name)?;
                let inline = inline.take().filter(|raw| !raw.is_empty());
                out.push(Fragment::Param {
                    name: std::mem::take(&mut name),
                    inline,
                });
                in_param = false;
            }
            ':' if in_param && inline.is_none() => {
                inline = Some(String::new());
            }
            _ if in_param => match inline.as_mut() {
                Some(raw) => raw.push(ch),
                None => name.push(ch),
            },
            _ => literal.push(ch),
        }
    }

    if in_param {
        return Err(PatternError::UnterminatedParameter {
            pattern: pattern.to_string(),
            start: param_start,
        });
    }

    if !literal.is_empty() {
        out.push(Fragment::Literal(literal));
    }

    Ok(out)
}

fn validate_name(pattern: &str, name: &str) -> PatternResult<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(PatternError::ParameterMissingName {
            pattern: pattern.to_string(),
        });
    };

    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(PatternError::ParameterInvalidStart {
            pattern: pattern.to_string(),
            name: name.to_string(),
            found: first,
        });
    }

    if let Some(invalid) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(PatternError::ParameterInvalidCharacter {
            pattern: pattern.to_string(),
            name: name.to_string(),
            invalid,
        });
    }

    Ok(())
}
