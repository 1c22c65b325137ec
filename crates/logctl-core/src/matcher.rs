//! Context-name patterns.
//!
//! A pattern is either absent (match everything), an exact name, or a name
//! containing `*`. Only the first `*` counts: the text before it is a prefix
//! the candidate must start with, and everything after it is ignored.

/// Token accepted on the command line as shorthand for the global context.
pub const GLOBAL_ALIAS: &str = ".";

/// Rewrite the `.` alias to the registry's global-context name.
pub fn resolve_alias<'a>(token: &'a str, global_name: &'a str) -> &'a str {
    if token == GLOBAL_ALIAS {
        global_name
    } else {
        token
    }
}

/// Whether `pattern` contains a wildcard.
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*')
}

/// A parsed context pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPattern<'a> {
    All,
    Exact(&'a str),
    /// Prefix before the first `*`.
    Prefix(&'a str),
}

impl<'a> ContextPattern<'a> {
    pub fn parse(pattern: Option<&'a str>) -> Self {
        match pattern {
            None => ContextPattern::All,
            Some(p) => match p.find('*') {
                None => ContextPattern::Exact(p),
                Some(k) => ContextPattern::Prefix(&p[..k]),
            },
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            ContextPattern::All => true,
            ContextPattern::Exact(exact) => name == *exact,
            ContextPattern::Prefix(prefix) => name.as_bytes().starts_with(prefix.as_bytes()),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, ContextPattern::Prefix(_))
    }
}
