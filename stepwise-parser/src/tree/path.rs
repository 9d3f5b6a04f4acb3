use std::{fmt, str::FromStr};

/// One step from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// The left-hand side of a binary operation, written `term[0]`.
    Left,

    /// The right-hand side of a binary operation, written `term[1]`.
    Right,

    /// The numerator of a fraction, written `num`. This is a virtual leaf: it only resolves when
    /// the numerator is an integer.
    Num,

    /// The denominator of a fraction, written `den`. Same restrictions as [`Segment::Num`].
    Den,
}

impl Segment {
    /// Returns the textual form of this segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "term[0]",
            Self::Right => "term[1]",
            Self::Num => "num",
            Self::Den => "den",
        }
    }
}

/// A path was written with a segment that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid path segment `{segment}`, expected one of `term[0]`, `term[1]`, `num`, `den`")]
pub struct PathParseError {
    /// The segment that could not be understood.
    pub segment: String,
}

impl FromStr for Segment {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "term[0]" => Ok(Self::Left),
            "term[1]" => Ok(Self::Right),
            "num" => Ok(Self::Num),
            "den" => Ok(Self::Den),
            _ => Err(PathParseError { segment: s.to_string() }),
        }
    }
}

/// An ordered sequence of [`Segment`]s identifying a node from the root. The empty path denotes
/// the root, written `root`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<Segment>);

impl Path {
    /// The path to the root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns true if this is the path to the root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if this path has no segments (equivalent to [`Path::is_root`]).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the last segment of this path, if any.
    pub fn last(&self) -> Option<Segment> {
        self.0.last().copied()
    }

    /// Returns a new path that descends one more step.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    /// Returns the path to the parent of this node, or [`None`] for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Returns true if `prefix` is equal to this path, or is an ancestor of it.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl<const N: usize> From<[Segment; N]> for Path {
    fn from(segments: [Segment; N]) -> Self {
        Self(segments.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.0.iter();
        match iter.next() {
            Some(first) => {
                f.write_str(first.as_str())?;
                for segment in iter {
                    write!(f, ".{}", segment.as_str())?;
                }
                Ok(())
            },
            None => f.write_str("root"),
        }
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    /// Parses a path such as `term[0].term[1].num`. Both `root` and the empty string denote the
    /// root. A leading `.` is tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "root" {
            return Ok(Self::root());
        }

        s.strip_prefix('.')
            .unwrap_or(s)
            .split('.')
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Path {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
