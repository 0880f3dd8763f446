use regex::Regex;
use std::borrow::Cow;

/// Compiles an anchored segment regex with `\d`, `\w` and `\s` (and their
/// negations) restricted to ASCII. The source text is kept as written so
/// matcher identity and stored programs are unaffected.
pub fn compile_segment_regex(source: &str) -> Result<Regex, regex::Error> {
    Regex::new(&ascii_perl_classes(source))
}

/// Rewrites Perl classes into explicit ASCII classes. Works inside bracket
/// expressions too, since the regex crate accepts nested classes.
pub(crate) fn ascii_perl_classes(source: &str) -> Cow<'_, str> {
    if !source.contains('\\') {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len() + 16);
    let mut chars = source.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push(ch);
            break;
        };
        match next {
            'd' => out.push_str("[0-9]"),
            'D' => out.push_str("[^0-9]"),
            'w' => out.push_str("[0-9A-Za-z_]"),
            'W' => out.push_str("[^0-9A-Za-z_]"),
            's' => out.push_str("[\\t\\n\\x0B\\x0C\\r ]"),
            'S' => out.push_str("[^\\t\\n\\x0B\\x0C\\r ]"),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Cow::Owned(out)
}
