use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const HTTP_METHOD_COUNT: usize = 7;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
    Head = 5,
    Options = 6,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; HTTP_METHOD_COUNT] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    #[inline]
    pub fn as_flag(&self) -> MethodSet {
        MethodSet::from_bits_truncate(1 << self.index())
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown http method '{0}'")]
pub struct UnknownMethod(pub String);

/// Method tokens are case-sensitive: `get` is not `GET`.
impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

bitflags! {
    /// Set of methods registered on a route or collected at a leaf.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MethodSet: u8 {
        const GET = 1 << 0;
        const POST = 1 << 1;
        const PUT = 1 << 2;
        const DELETE = 1 << 3;
        const PATCH = 1 << 4;
        const HEAD = 1 << 5;
        const OPTIONS = 1 << 6;
    }
}

impl MethodSet {
    pub fn has(&self, method: HttpMethod) -> bool {
        self.contains(method.as_flag())
    }

    /// Methods in declaration order (GET first).
    pub fn methods(&self) -> impl Iterator<Item = HttpMethod> + '_ {
        HttpMethod::ALL.into_iter().filter(|m| self.has(*m))
    }

    pub fn first(&self) -> Option<HttpMethod> {
        self.methods().next()
    }
}

impl From<HttpMethod> for MethodSet {
    fn from(method: HttpMethod) -> Self {
        method.as_flag()
    }
}

impl FromIterator<HttpMethod> for MethodSet {
    fn from_iter<I: IntoIterator<Item = HttpMethod>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MethodSet::empty(), |acc, m| acc | m.as_flag())
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, method) in self.methods().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            f.write_str(method.as_str())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_method_tokens_case_sensitively() {
        assert_eq!("GET".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("OPTIONS".parse::<HttpMethod>(), Ok(HttpMethod::Options));
        assert!("get".parse::<HttpMethod>().is_err());
        assert!("Options".parse::<HttpMethod>().is_err());
        assert!("PURGE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn method_set_lists_members_in_declaration_order() {
        let set: MethodSet = [HttpMethod::Post, HttpMethod::Get].into_iter().collect();
        let listed: Vec<HttpMethod> = set.methods().collect();
        assert_eq!(listed, vec![HttpMethod::Get, HttpMethod::Post]);
        assert_eq!(set.to_string(), "GET, POST");
    }
}
