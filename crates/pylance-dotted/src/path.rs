//! Dotted path parsing and serialization.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Segment lexer: a run of characters that are not `.`, `[` or `]`, or any
/// run enclosed in an angle-bracket pair.
static SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^.\[\]]+)|<([^>]+)>").expect("segment pattern is valid"));

/// An ordered sequence of traversal segments parsed from a dotted key.
///
/// A segment normally corresponds to one level of nesting. Segments that
/// themselves contain a literal dot are written wrapped in angle brackets:
/// `a.<b.c>.d` parses to `["a", "b.c", "d"]`. Serialization is the exact
/// inverse, so `parse(serialize(p)) == p` for every path.
///
/// # Examples
///
/// ```
/// use pylance_dotted::DottedPath;
///
/// let path = DottedPath::parse("python.analysis.extraPaths");
/// assert_eq!(path.segments(), ["python", "analysis", "extraPaths"]);
///
/// let escaped = DottedPath::parse("basedOn.<editor.codeActionsOnSave>");
/// assert_eq!(escaped.segments(), ["basedOn", "editor.codeActionsOnSave"]);
/// assert_eq!(escaped.to_string(), "basedOn.<editor.codeActionsOnSave>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DottedPath {
    segments: Vec<String>,
}

impl DottedPath {
    /// Parses a dotted key into its segments.
    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        let segments = SEGMENT
            .captures_iter(dotted)
            .map(|c| {
                c.get(1)
                    .or_else(|| c.get(2))
                    .map_or_else(String::new, |m| m.as_str().to_string())
            })
            .collect();
        Self { segments }
    }

    /// Builds a path from pre-split segments.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the segments in traversal order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` when the path has no segments.
    ///
    /// An empty path addresses the container itself.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Splits off the first segment, returning it and the remaining path.
    #[must_use]
    pub fn split_first(&self) -> Option<(&str, Self)> {
        let (first, rest) = self.segments.split_first()?;
        Some((
            first.as_str(),
            Self {
                segments: rest.to_vec(),
            },
        ))
    }

    /// Splits off the last segment, returning the leading path and the
    /// final segment.
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, &str)> {
        let (last, init) = self.segments.split_last()?;
        Some((
            Self {
                segments: init.to_vec(),
            },
            last.as_str(),
        ))
    }
}

impl fmt::Display for DottedPath {
    /// Serializes the path, wrapping any segment containing a literal dot
    /// in angle brackets.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            if segment.contains('.') {
                write!(f, "<{segment}>")?;
            } else {
                f.write_str(segment)?;
            }
        }
        Ok(())
    }
}

impl From<&str> for DottedPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}
