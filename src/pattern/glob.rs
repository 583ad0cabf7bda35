//! Shell-style wildcard patterns
//!
//! `*` matches any run of characters and `?` a single character; everything else is
//! compared literally. Matching itself is delegated to a [`GlobEngine`].

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::image::{NewerFn, by_created_desc};
use crate::pattern::{GLOB_PREFIX, TagMatcher};

/// Wildcard matching primitive
#[cfg_attr(test, automock)]
pub trait GlobEngine: Send + Sync {
    /// Returns true if `candidate` matches the glob `pattern`
    fn glob(&self, pattern: &str, candidate: &str) -> bool;
}

/// Default engine backed by the `glob` crate.
///
/// Only `*` and `?` are wildcards. Brackets are escaped so they match literally, and runs
/// of `*` collapse into one since the `glob` crate reserves `**` for path components.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellGlob;

impl ShellGlob {
    fn translate(pattern: &str) -> String {
        let mut translated = String::with_capacity(pattern.len());
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' => {
                    while chars.peek() == Some(&'*') {
                        chars.next();
                    }
                    translated.push('*');
                }
                '[' | ']' => translated.push_str(&glob::Pattern::escape(&c.to_string())),
                _ => translated.push(c),
            }
        }
        translated
    }
}

impl GlobEngine for ShellGlob {
    fn glob(&self, pattern: &str, candidate: &str) -> bool {
        match glob::Pattern::new(&Self::translate(pattern)) {
            Ok(compiled) => compiled.matches(candidate),
            Err(e) => {
                debug!(
                    "Glob '{}' does not compile ({}), comparing literally",
                    pattern, e
                );
                pattern == candidate
            }
        }
    }
}

/// Pattern matching tags by glob expression. Holds the expression without its prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobPattern {
    expression: String,
}

impl GlobPattern {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    /// The glob expression without the `glob:` prefix
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Match `tag` using the given engine instead of [`ShellGlob`]
    pub fn matches_with(&self, engine: &dyn GlobEngine, tag: &str) -> bool {
        engine.glob(&self.expression, tag)
    }
}

impl TagMatcher for GlobPattern {
    fn matches(&self, tag: &str) -> bool {
        self.matches_with(&ShellGlob, tag)
    }

    fn image_newer_fn(&self) -> NewerFn {
        by_created_desc
    }

    fn is_valid(&self) -> bool {
        true
    }
}

impl std::fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", GLOB_PREFIX, self.expression)
    }
}
