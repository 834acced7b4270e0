//! Endpoint support registry
//!
//! Each provider module declares an ordered list of rules. A rule pattern is
//! a single object name, a braced set (`{a,b,c}`) or `*`; the first rule
//! whose pattern matches an object decides which operations it supports.

use crate::model::Operation;
use std::fmt;
use std::ops::BitOr;

/// Set of supported operations
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Support(u8);

impl Support {
    pub const NONE: Self = Self(0);
    pub const READ: Self = Self(1);
    pub const WRITE: Self = Self(1 << 1);
    pub const DELETE: Self = Self(1 << 2);
    pub const SUBSCRIBE: Self = Self(1 << 3);
    pub const METADATA: Self = Self(1 << 4);
    pub const BATCH_WRITE: Self = Self(1 << 5);
    pub const RECORD_COUNT: Self = Self(1 << 6);

    /// Read and metadata, the baseline of every listed object
    pub const READ_ONLY: Self = Self::READ.with(Self::METADATA);
    /// Read, metadata, write and delete
    pub const CRUD: Self = Self::READ_ONLY.with(Self::WRITE).with(Self::DELETE);

    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Flag of one operation
    pub const fn of(op: Operation) -> Self {
        match op {
            Operation::Read => Self::READ,
            Operation::Write => Self::WRITE,
            Operation::Delete => Self::DELETE,
            Operation::Subscribe => Self::SUBSCRIBE,
            Operation::Metadata => Self::METADATA,
            Operation::BatchWrite => Self::BATCH_WRITE,
            Operation::RecordCount => Self::RECORD_COUNT,
        }
    }

    pub fn supports(self, op: Operation) -> bool {
        self.contains(Self::of(op))
    }
}

impl BitOr for Support {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl fmt::Debug for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Support, &str); 7] = [
            (Support::READ, "read"),
            (Support::WRITE, "write"),
            (Support::DELETE, "delete"),
            (Support::SUBSCRIBE, "subscribe"),
            (Support::METADATA, "metadata"),
            (Support::BATCH_WRITE, "batch_write"),
            (Support::RECORD_COUNT, "record_count"),
        ];
        f.debug_set()
            .entries(
                NAMES
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, name)| name),
            )
            .finish()
    }
}

/// One endpoint pattern and what it supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportRule {
    pub pattern: &'static str,
    pub support: Support,
}

impl SupportRule {
    pub const fn new(pattern: &'static str, support: Support) -> Self {
        Self { pattern, support }
    }

    /// True when the pattern covers `object`
    pub fn matches(&self, object: &str) -> bool {
        let pattern = self.pattern.trim();
        if pattern == "*" {
            return true;
        }
        match pattern
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(set) => set.split(',').any(|name| name.trim() == object),
            None => pattern == object,
        }
    }
}

/// Ordered rules of one module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndpointSupport {
    rules: &'static [SupportRule],
}

impl EndpointSupport {
    pub const fn new(rules: &'static [SupportRule]) -> Self {
        Self { rules }
    }

    /// First-match lookup; unmatched objects support nothing
    pub fn support_for(&self, object: &str) -> Support {
        self.rules
            .iter()
            .find(|rule| rule.matches(object))
            .map_or(Support::NONE, |rule| rule.support)
    }

    pub fn supports(&self, object: &str, op: Operation) -> bool {
        self.support_for(object).supports(op)
    }

    /// Objects named explicitly by the rules (wildcards excluded)
    pub fn object_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for rule in self.rules {
            let pattern = rule.pattern.trim();
            match pattern
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
            {
                Some(set) => names.extend(set.split(',').map(str::trim)),
                None if pattern != "*" => names.push(pattern),
                None => {}
            }
        }
        names
    }
}
