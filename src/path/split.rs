use memchr::{memchr_iter, memchr2};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathOptions {
    /// Cut the URI at the first `?` or `#`.
    pub strip_query: bool,
    /// Treat `/users/` like `/users`.
    pub ignore_trailing_slash: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            strip_query: true,
            ignore_trailing_slash: false,
        }
    }
}

/// A request path and the byte spans of its `/`-delimited segments.
#[derive(Debug, Clone)]
pub struct SplitPath<'a> {
    path: &'a str,
    spans: SmallVec<[(usize, usize); 8]>,
}

impl<'a> SplitPath<'a> {
    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[inline]
    pub fn segment(&self, index: usize) -> Option<&'a str> {
        self.spans
            .get(index)
            .and_then(|&(start, end)| self.path.get(start..end))
    }

    /// Byte offset of segment `index` inside [`SplitPath::path`].
    #[inline]
    pub fn offset(&self, index: usize) -> Option<usize> {
        self.spans.get(index).map(|&(start, _)| start)
    }

    pub fn segments(&self) -> impl Iterator<Item = &'a str> + '_ {
        (0..self.spans.len()).filter_map(move |i| self.segment(i))
    }
}

/// Splits `uri` into segments. `""` and `"/"` have none; every other `/`
/// opens a segment, so a trailing slash yields a trailing empty segment
/// unless `ignore_trailing_slash` is set.
#[tracing::instrument(level = "trace", skip(uri, options), fields(uri_len = uri.len() as u64))]
pub fn split_path<'a>(uri: &'a str, options: &PathOptions) -> SplitPath<'a> {
    let mut path = uri;
    if options.strip_query
        && let Some(cut) = memchr2(b'?', b'#', path.as_bytes())
    {
        path = &path[..cut];
    }
    if options.ignore_trailing_slash && path.len() > 1 {
        path = path.strip_suffix('/').unwrap_or(path);
    }

    let mut spans = SmallVec::new();
    let start = usize::from(path.starts_with('/'));
    if start < path.len() {
        let mut segment_start = start;
        for slash in memchr_iter(b'/', &path.as_bytes()[start..]) {
            let end = start + slash;
            spans.push((segment_start, end));
            segment_start = end + 1;
        }
        spans.push((segment_start, path.len()));
    }

    SplitPath { path, spans }
}
