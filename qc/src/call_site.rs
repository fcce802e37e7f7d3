//! Explicit call-site identity.
//!
//! A property body is executed many times, and each textual call such as
//! `ctx.int(0, 10)` must keep drawing from the same generator across those
//! executions while a second, identical-looking call elsewhere gets its own.
//! The identity of "where the draw happened" is therefore part of the
//! generator key. It is never inferred from the running stack: it is either the
//! compiler-provided caller location (`#[track_caller]`, [`call_site!`]) or a
//! token the caller supplies.

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// Identity of the point in a property that requests a draw
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallSite {
    /// A source location
    Location {
        file: &'static str,
        line: u32,
        column: u32,
    },
    /// A caller-chosen label
    Label(Cow<'static, str>),
    /// A caller-chosen ordinal, e.g. a counter scoped to the property body
    Index(u64),
}

impl CallSite {
    /// The source location of the caller.
    ///
    /// Inside a `#[track_caller]` function this resolves to *its* caller, so
    /// helper functions that draw values can forward identity outward by being
    /// `#[track_caller]` themselves.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }

    pub fn label(label: impl Into<Cow<'static, str>>) -> Self {
        CallSite::Label(label.into())
    }

    pub fn index(index: u64) -> Self {
        CallSite::Index(index)
    }
}

impl From<&Location<'static>> for CallSite {
    fn from(location: &Location<'static>) -> Self {
        CallSite::Location {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallSite::Location { file, line, column } => write!(f, "{}:{}:{}", file, line, column),
            CallSite::Label(label) => write!(f, "#{}", label),
            CallSite::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Expands to the [`CallSite`] of the macro invocation itself
///
/// ```
/// let here = qc::call_site!();
/// let there = qc::call_site!();
/// assert_ne!(here, there);
/// ```
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::Location {
            file: file!(),
            line: line!(),
            column: column!(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn forwarded() -> CallSite {
        CallSite::caller()
    }

    #[test]
    fn test_distinct_lines_give_distinct_sites() {
        let a = CallSite::caller();
        let b = CallSite::caller();
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_site_in_a_loop_is_stable() {
        let sites: Vec<CallSite> = (0..3).map(|_| CallSite::caller()).collect();
        assert_eq!(sites[0], sites[1]);
        assert_eq!(sites[1], sites[2]);
    }

    #[test]
    fn test_track_caller_forwards_identity() {
        let first = forwarded();
        let second = forwarded();
        assert_ne!(first, second);
        match first {
            CallSite::Location { file, .. } => assert!(file.ends_with("call_site.rs")),
            other => panic!("expected a location, got {:?}", other),
        }
    }

    #[test]
    fn test_macro_matches_line() {
        let site = call_site!();
        match site {
            CallSite::Location { line, .. } => assert_eq!(line, line!() - 2),
            other => panic!("expected a location, got {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(CallSite::label("left").to_string(), "#left");
        assert_eq!(CallSite::index(3).to_string(), "#3");
        let site = CallSite::Location {
            file: "src/lib.rs",
            line: 4,
            column: 9,
        };
        assert_eq!(site.to_string(), "src/lib.rs:4:9");
    }
}
