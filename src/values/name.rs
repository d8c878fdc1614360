use core::fmt;

use ecow::EcoString;
use smallvec::SmallVec;

/// An ordered, non-empty sequence of identifier segments.
///
/// A bare identifier is a single segment; a dotted reference `a.b.c` is three
/// segments. This is the only key type universes resolve names by — the
/// evaluator collapses attribute chains into one `QualifiedName` instead of
/// ever traversing attributes on a resolved value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName(SmallVec<[EcoString; 2]>);

impl QualifiedName {
    pub fn single(segment: impl Into<EcoString>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(segment.into());
        Self(segments)
    }

    /// Build from segments. The sequence must be non-empty.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EcoString>,
    {
        let segments: SmallVec<[EcoString; 2]> =
            segments.into_iter().map(Into::into).collect();
        debug_assert!(!segments.is_empty(), "qualified name must have segments");
        Self(segments)
    }

    pub fn segments(&self) -> &[EcoString] {
        &self.0
    }

    /// True when the name has more than one segment.
    pub fn is_dotted(&self) -> bool {
        self.0.len() > 1
    }
}

impl From<&str> for QualifiedName {
    fn from(segment: &str) -> Self {
        QualifiedName::single(segment)
    }
}

impl<const N: usize> From<[&str; N]> for QualifiedName {
    fn from(segments: [&str; N]) -> Self {
        QualifiedName::from_segments(segments)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}
