//! Qualified-name paths.
//!
//! A qualified name records the lexical nesting of a definition, from the
//! outermost enclosing class or function down to the definition itself:
//!
//! ```text
//! Outer.Inner.method          method of a nested class
//! factory.<locals>.Local.m    method of a class defined inside a function
//! ```
//!
//! `<locals>` segments are synthetic: they mark a function's local scope
//! and never name an attribute.

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Segment marking a function-local scope.
pub const LOCALS_MARKER: &str = "<locals>";

/// Errors while building a qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QualNameError {
    /// No segments at all.
    #[error("qualified name must not be empty")]
    Empty,

    /// A segment between two dots is empty.
    #[error("qualified name '{path}' contains an empty segment")]
    EmptySegment { path: String },
}

/// Ordered, non-empty sequence of scope names ending in the definition's
/// own name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct QualName {
    segments: SmallVec<[Arc<str>; 4]>,
}

impl QualName {
    /// Parse a dotted path such as `Outer.Inner.method`.
    pub fn parse(path: &str) -> Result<Self, QualNameError> {
        Self::from_segments(path.split('.')).map_err(|err| match err {
            QualNameError::EmptySegment { .. } => QualNameError::EmptySegment {
                path: path.to_string(),
            },
            other => other,
        })
    }

    /// Build from individual segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, QualNameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: SmallVec<[Arc<str>; 4]> = SmallVec::new();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() {
                return Err(QualNameError::EmptySegment {
                    path: out.join("."),
                });
            }
            out.push(Arc::from(segment));
        }
        if out.is_empty() {
            return Err(QualNameError::Empty);
        }
        Ok(Self { segments: out })
    }

    /// Single-segment name for a top-level definition.
    pub fn top_level(name: impl Into<Arc<str>>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(name.into());
        Self { segments }
    }

    /// Name of a definition nested directly inside this one.
    pub fn child(&self, name: impl Into<Arc<str>>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Name of a definition inside this function's local scope.
    pub fn local_child(&self, name: impl Into<Arc<str>>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Arc::from(LOCALS_MARKER));
        segments.push(name.into());
        Self { segments }
    }

    /// All segments, outermost first.
    #[inline]
    pub fn segments(&self) -> &[Arc<str>] {
        &self.segments
    }

    /// Outermost segment.
    #[inline]
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// Segments between the head and the definition's own name.
    ///
    /// Empty for one- and two-segment paths.
    #[inline]
    pub fn tail(&self) -> &[Arc<str>] {
        match self.segments.len() {
            0..=2 => &[],
            n => &self.segments[1..n - 1],
        }
    }

    /// The definition's own (short) name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a qualified name has at least one segment.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check whether `segment` is a synthetic local-scope marker.
    #[inline]
    pub fn is_marker(segment: &str) -> bool {
        segment == LOCALS_MARKER
    }

    /// Check if the path passes through a function's local scope.
    pub fn has_locals(&self) -> bool {
        self.segments.iter().any(|s| Self::is_marker(s))
    }
}

impl fmt::Display for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualName({self})")
    }
}

impl FromStr for QualName {
    type Err = QualNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(path: &QualName) -> Vec<&str> {
        path.tail().iter().map(|s| &**s).collect()
    }

    #[test]
    fn test_parse_nested_method() {
        let path = QualName::parse("Outer.Inner.method").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.head(), "Outer");
        assert_eq!(seg(&path), vec!["Inner"]);
        assert_eq!(path.name(), "method");
        assert_eq!(path.to_string(), "Outer.Inner.method");
    }

    #[test]
    fn test_top_level_function() {
        let path = QualName::parse("free").unwrap();
        assert_eq!(path.head(), "free");
        assert_eq!(path.name(), "free");
        assert!(path.tail().is_empty());
    }

    #[test]
    fn test_simple_method_has_empty_tail() {
        let path = QualName::parse("Class.method").unwrap();
        assert_eq!(path.head(), "Class");
        assert!(path.tail().is_empty());
    }

    #[test]
    fn test_locals_marker() {
        let path = QualName::top_level("factory")
            .local_child("Local")
            .child("method");
        assert_eq!(path.to_string(), "factory.<locals>.Local.method");
        assert!(path.has_locals());
        assert_eq!(seg(&path), vec!["<locals>", "Local"]);
        assert!(QualName::is_marker(&path.tail()[0]));
    }

    #[test]
    fn test_rejects_empty_segments() {
        assert_eq!(
            QualName::parse("Outer..method"),
            Err(QualNameError::EmptySegment {
                path: "Outer..method".into()
            })
        );
        assert!(QualName::parse("").is_err());
        assert_eq!(
            QualName::from_segments(Vec::<&str>::new()),
            Err(QualNameError::Empty)
        );
    }

    #[test]
    fn test_from_str() {
        let path: QualName = "A.b".parse().unwrap();
        assert_eq!(path, QualName::top_level("A").child("b"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn head_tail_name_partition_path(
                segments in prop::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,6}|<locals>", 1..6)
            ) {
                let path = QualName::from_segments(segments.iter().map(String::as_str)).unwrap();
                let n = segments.len();

                prop_assert_eq!(path.head(), segments[0].as_str());
                prop_assert_eq!(path.name(), segments[n - 1].as_str());
                let expected_tail: &[String] = if n > 2 { &segments[1..n - 1] } else { &[] };
                prop_assert_eq!(seg(&path), expected_tail.iter().map(String::as_str).collect::<Vec<_>>());
                prop_assert_eq!(QualName::parse(&path.to_string()).unwrap(), path);
            }
        }
    }
}
