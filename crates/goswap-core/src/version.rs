//! Go version parsing and comparison.

use crate::error::{Error, Result};
use regex_lite::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

/// Product tag prefixed to catalog versions and slot keys.
pub const PRODUCT_TAG: &str = "go";

static EXACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:go)?(\d+)\.(\d+)(?:\.(\d+))?(?:(beta|rc)(\d+))?$").expect("valid pattern")
});

static EMBEDDED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?(?:(beta|rc)(\d+))?").expect("valid pattern")
});

/// Kind of a pre-release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreReleaseKind {
    Beta,
    Rc,
}

impl PreReleaseKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Beta => "beta",
            Self::Rc => "rc",
        }
    }
}

/// Release channel of a version.
///
/// Variant order matters: every pre-release sorts before the stable release
/// of the same number, betas before release candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    PreRelease { kind: PreReleaseKind, ordinal: u32 },
    Stable,
}

/// The `major.minor` key shared by all patches of a Go release line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub major: u32,
    pub minor: u32,
}

impl Slot {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{}", PRODUCT_TAG, self.major, self.minor)
    }
}

/// A parsed Go version such as `1.14`, `go1.14.7` or `go1.16rc1`.
///
/// Equality, hashing and ordering ignore the original literal.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
    pub channel: Channel,
    literal: String,
}

impl VersionSpec {
    /// Parse a version, with or without the `go` tag and pre-release suffix.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let captures = EXACT_PATTERN
            .captures(trimmed)
            .ok_or_else(|| Error::malformed_version(input))?;
        Self::from_captures(&captures, trimmed).ok_or_else(|| Error::malformed_version(input))
    }

    /// Parse a requested version, which must be a bare `major.minor[.patch]`.
    pub fn parse_request(input: &str) -> Result<Self> {
        let spec = Self::parse(input)?;
        if !spec.is_stable() {
            return Err(Error::malformed_version(input));
        }
        Ok(spec)
    }

    /// Find the first version embedded in an arbitrary string.
    ///
    /// Used on directory names such as `1.14.6` or `go1.13.14-old`.
    pub fn find_in(haystack: &str) -> Option<Self> {
        let captures = EMBEDDED_PATTERN.captures(haystack)?;
        let literal = captures.get(0)?.as_str();
        Self::from_captures(&captures, literal)
    }

    fn from_captures(captures: &Captures<'_>, literal: &str) -> Option<Self> {
        let number = |idx: usize| -> Option<Option<u32>> {
            match captures.get(idx) {
                Some(m) => m.as_str().parse().ok().map(Some),
                None => Some(None),
            }
        };

        let major = number(1)??;
        let minor = number(2)??;
        let patch = number(3)?;
        let channel = match captures.get(4).map(|m| m.as_str()) {
            Some(kind) => {
                let kind = if kind == "beta" {
                    PreReleaseKind::Beta
                } else {
                    PreReleaseKind::Rc
                };
                Channel::PreRelease {
                    kind,
                    ordinal: number(5)??,
                }
            }
            None => Channel::Stable,
        };

        Some(Self {
            major,
            minor,
            patch,
            channel,
            literal: literal.to_string(),
        })
    }

    /// The release line this version belongs to.
    pub fn slot(&self) -> Slot {
        Slot::new(self.major, self.minor)
    }

    /// Whether this is a stable release.
    pub fn is_stable(&self) -> bool {
        self.channel == Channel::Stable
    }

    /// The string this version was parsed from.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// The version number without the product tag (e.g. `1.14.7`, `1.16rc1`).
    pub fn number(&self) -> String {
        let mut out = format!("{}.{}", self.major, self.minor);
        if let Some(patch) = self.patch {
            out.push_str(&format!(".{}", patch));
        }
        if let Channel::PreRelease { kind, ordinal } = self.channel {
            out.push_str(&format!("{}{}", kind.as_str(), ordinal));
        }
        out
    }

    /// The version number with the product tag (e.g. `go1.14.7`).
    pub fn tagged(&self) -> String {
        format!("{}{}", PRODUCT_TAG, self.number())
    }

    /// Check whether this version satisfies a requested version.
    ///
    /// - `1.14` matches any `1.14.x` and `1.14` itself
    /// - `1.14.7` matches only `1.14.7`
    /// - `1.14.0` matches `1.14`, the first release of a line has no patch
    ///
    /// The channel is not compared; callers pick the channel they scan.
    pub fn matches_request(&self, request: &VersionSpec) -> bool {
        if self.slot() != request.slot() {
            return false;
        }
        match request.patch {
            Some(patch) => self.patch.unwrap_or(0) == patch,
            None => true,
        }
    }

    /// Check whether this pre-release belongs to the requested release.
    ///
    /// `go1.16rc1` and `go1.16beta2` belong to `1.16` and `1.16.0`, but not
    /// to `1.16.1`.
    pub fn is_prerelease_of(&self, request: &VersionSpec) -> bool {
        !self.is_stable()
            && self.slot() == request.slot()
            && self.patch.unwrap_or(0) == request.patch.unwrap_or(0)
    }
}

impl PartialEq for VersionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionSpec {}

impl Hash for VersionSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.channel.hash(state);
    }
}

impl PartialOrd for VersionSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then(self.channel.cmp(&other.channel))
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for VersionSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
