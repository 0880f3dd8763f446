use routetree_rs::pattern::{
    DEFAULT_PARAM_PATTERN, PatternError, Segment, parse_pattern, parse_pattern_default,
};
use std::collections::HashMap;

fn parse(pattern: &str) -> Result<Vec<Segment>, PatternError> {
    parse_pattern_default(pattern, &HashMap::new())
}

fn param_source(segment: &Segment) -> &str {
    match segment {
        Segment::Parameter(param) => &param.source,
        other => panic!("expected parameter segment, got {other:?}"),
    }
}

#[test]
fn parse_when_pattern_mixes_statics_and_params_then_yields_one_segment_per_component() {
    let segments = parse("/api/v1/users/{id}/files/{name}.{ext}").unwrap();
    assert_eq!(segments.len(), 6);
    assert_eq!(
        segments[0],
        Segment::Static {
            text: "api".to_string()
        }
    );
    assert_eq!(param_source(&segments[3]), "^([^/]+)$");
    assert_eq!(param_source(&segments[5]), "^([^/]+)\\.([^/]+)$");
}

#[test]
fn parse_when_literal_has_regex_metacharacters_then_escapes_them() {
    let segments = parse("/v{major}.{minor}+beta").unwrap();
    let source = param_source(&segments[0]);
    assert_eq!(source, "^v([^/]+)\\.([^/]+)\\+beta$");
    match &segments[0] {
        Segment::Parameter(param) => {
            let caps = param.regex.captures("v1.2+beta").unwrap();
            assert_eq!(&caps[param.group_indices[0]], "1");
            assert_eq!(&caps[param.group_indices[1]], "2");
            assert!(!param.regex.is_match("v1x2+beta"));
        }
        other => panic!("expected parameter segment, got {other:?}"),
    }
}

#[test]
fn parse_when_default_pattern_given_then_used_for_unconstrained_params() {
    let segments = parse_pattern("/{id}", &HashMap::new(), "[0-9]+").unwrap();
    assert_eq!(param_source(&segments[0]), "^([0-9]+)$");
    assert_eq!(DEFAULT_PARAM_PATTERN, "[^/]+");
}

#[test]
fn parse_when_empty_inline_regex_then_falls_back_to_default() {
    let segments = parse("/{id:}").unwrap();
    assert_eq!(param_source(&segments[0]), "^([^/]+)$");
}

#[test]
fn parse_when_brace_is_nested_then_reports_nested_parameter() {
    match parse("/x/{a{b}}") {
        Err(PatternError::NestedParameter { name, index, .. }) => {
            assert_eq!(name, "a");
            assert_eq!(index, 5);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn parse_when_closing_brace_is_stray_then_reports_its_position() {
    match parse("/foo}") {
        Err(PatternError::UnexpectedClosingBrace { index, pattern }) => {
            assert_eq!(index, 4);
            assert_eq!(pattern, "/foo}");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn parse_when_parameter_spans_a_slash_then_reports_unterminated() {
    match parse("/foo/{bar/baz}") {
        Err(PatternError::UnterminatedParameter { start, .. }) => assert_eq!(start, 5),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn parse_when_parameter_name_is_invalid_then_rejects_it() {
    assert!(matches!(
        parse("/{}"),
        Err(PatternError::ParameterMissingName { .. })
    ));
    assert!(matches!(
        parse("/{1id}"),
        Err(PatternError::ParameterInvalidStart { found: '1', .. })
    ));
    assert!(matches!(
        parse("/{user-id}"),
        Err(PatternError::ParameterInvalidCharacter { invalid: '-', .. })
    ));
    assert!(parse("/{_private9}").is_ok());
}

#[test]
fn parse_when_name_repeats_in_one_segment_then_rejects_duplicate() {
    match parse("/{a}-{a}") {
        Err(PatternError::DuplicateParameter { name, .. }) => assert_eq!(name, "a"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn parse_when_constraint_map_regex_invalid_then_reports_parameter() {
    let mut constraints = HashMap::new();
    constraints.insert("id".to_string(), "[0-9".to_string());
    match parse_pattern_default("/users/{id}", &constraints) {
        Err(PatternError::InvalidRegex { name, .. }) => assert_eq!(name, "id"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn pattern_error_when_displayed_then_names_the_pattern() {
    let err = parse("users/{id}").unwrap_err();
    assert_eq!(err.pattern(), "users/{id}");
    assert_eq!(err.to_string(), "pattern 'users/{id}' must start with '/'");
}
