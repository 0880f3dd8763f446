use crate::types::{ParamOffset, RouteParams};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static PARAM_BUF: RefCell<Vec<ParamOffset>> = RefCell::new(Vec::with_capacity(4));
}

/// Runs `f` with this thread's cleared capture buffer. Dispatch is not
/// reentrant on one thread, so the borrow never overlaps.
pub fn with_param_buffer<R>(f: impl FnOnce(&mut Vec<ParamOffset>) -> R) -> R {
    PARAM_BUF.with(|cell| {
        let mut buf = cell.borrow_mut();
        buf.clear();
        f(&mut buf)
    })
}

/// Zips capture offsets with leaf parameter names, slicing values out of `path`.
pub(crate) fn captures_to_map<S: AsRef<str>>(
    path: &str,
    names: &[S],
    captures: &[ParamOffset],
) -> RouteParams {
    let mut map = HashMap::with_capacity(names.len());
    for (name, &(start, len)) in names.iter().zip(captures.iter()) {
        let end = start.saturating_add(len);
        if let Some(value) = path.get(start..end) {
            map.insert(name.as_ref().to_string(), value.to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_cleared_between_uses() {
        with_param_buffer(|buf| buf.push((1, 2)));
        with_param_buffer(|buf| assert!(buf.is_empty()));
    }

    #[test]
    fn captures_are_zipped_in_order() {
        let map = captures_to_map("/users/42/posts/7", &["id", "postId"], &[(7, 2), (16, 1)]);
        assert_eq!(map.get("id").map(String::as_str), Some("42"));
        assert_eq!(map.get("postId").map(String::as_str), Some("7"));
    }

    #[test]
    fn out_of_range_offsets_are_skipped() {
        let map = captures_to_map("/a", &["x"], &[(5, 3)]);
        assert!(map.is_empty());
    }
}
