//! Dependency and version types, plus an Arch-`vercmp`-equivalent ordering
//! the original crate this was grounded on left unimplemented.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use super::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnorderedVersion {
    pub epoch: String,
    pub pkgver: String,
    pub pkgrel: String,
}

impl Display for UnorderedVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.epoch.is_empty() {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.pkgver)?;
        if !self.pkgrel.is_empty() {
            write!(f, "-{}", self.pkgrel)?;
        }
        Ok(())
    }
}

impl TryFrom<&str> for UnorderedVersion {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let (epoch, value) = match value.split_once(':') {
            Some((epoch, remaining)) => (epoch.into(), remaining),
            None => (String::new(), value),
        };
        let (pkgver, pkgrel) = match value.rsplit_once('-') {
            Some((pkgver, pkgrel)) => (pkgver.into(), pkgrel.into()),
            None => (value.into(), String::new()),
        };
        Ok(Self { epoch, pkgver, pkgrel })
    }
}

/// Splits a version segment into alternating runs of digits and
/// non-digits, the way `vercmp`'s segment comparison does, and compares
/// them piece by piece: numeric runs compare numerically, everything else
/// lexically; a segment that runs out first loses unless the remainder on
/// the other side is purely alphabetic (pacman treats trailing alpha as
/// older, e.g. `1.0a < 1.0`).
fn split_segments(s: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let bytes = s.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let is_digit = bytes[start].is_ascii_digit();
        let mut end = start + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() == is_digit {
            end += 1;
        }
        segments.push(&s[start..end]);
        start = end;
    }
    segments
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    match (a.bytes().next().map(|c| c.is_ascii_digit()), b.bytes().next().map(|c| c.is_ascii_digit())) {
        (Some(true), Some(true)) => {
            let a_trimmed = a.trim_start_matches('0');
            let b_trimmed = b.trim_start_matches('0');
            a_trimmed.len().cmp(&b_trimmed.len()).then_with(|| a_trimmed.cmp(b_trimmed))
        }
        // A numeric segment always outranks an alphabetic one.
        (Some(true), _) => Ordering::Greater,
        (_, Some(true)) => Ordering::Less,
        _ => a.cmp(b),
    }
}

/// Compares two dotted/dashed version strings the way `vercmp` compares
/// `pkgver` (or `pkgver-pkgrel`) components: split on runs of
/// alphanumeric-vs-other characters, skipping separator-only segments,
/// and compare piecewise.
fn compare_pkgver(a: &str, b: &str) -> Ordering {
    let a_segments: Vec<&str> = split_segments(a).into_iter().filter(|s| !is_separator(s)).collect();
    let b_segments: Vec<&str> = split_segments(b).into_iter().filter(|s| !is_separator(s)).collect();
    for (sa, sb) in a_segments.iter().zip(b_segments.iter()) {
        let ord = compare_segment(sa, sb);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_segments.len().cmp(&b_segments.len())
}

fn is_separator(segment: &str) -> bool {
    !segment.bytes().next().map(|c| c.is_ascii_alphanumeric()).unwrap_or(false)
}

impl UnorderedVersion {
    /// Arch/pacman `vercmp` ordering: epoch first (numeric, defaulting to
    /// `0`), then pkgver segments, then pkgrel segments.
    pub fn vercmp(&self, other: &Self) -> Ordering {
        let epoch_a: u64 = self.epoch.parse().unwrap_or(0);
        let epoch_b: u64 = other.epoch.parse().unwrap_or(0);
        epoch_a
            .cmp(&epoch_b)
            .then_with(|| compare_pkgver(&self.pkgver, &other.pkgver))
            .then_with(|| compare_pkgver(&self.pkgrel, &other.pkgrel))
    }
}

impl PartialOrd for UnorderedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.vercmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyOrder {
    Greater,
    GreaterOrEqual,
    Equal,
    LessOrEqual,
    Less,
}

impl Display for DependencyOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DependencyOrder::Greater => ">",
            DependencyOrder::GreaterOrEqual => ">=",
            DependencyOrder::Equal => "=",
            DependencyOrder::LessOrEqual => "<=",
            DependencyOrder::Less => "<",
        })
    }
}

impl DependencyOrder {
    /// `true` if `actual` satisfies `self required`.
    pub fn satisfied_by(self, required: &UnorderedVersion, actual: &UnorderedVersion) -> bool {
        match actual.vercmp(required) {
            Ordering::Less => matches!(self, DependencyOrder::Less | DependencyOrder::LessOrEqual),
            Ordering::Equal => matches!(
                self,
                DependencyOrder::Equal | DependencyOrder::LessOrEqual | DependencyOrder::GreaterOrEqual
            ),
            Ordering::Greater => matches!(self, DependencyOrder::Greater | DependencyOrder::GreaterOrEqual),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedVersion {
    pub order: DependencyOrder,
    pub unordered: UnorderedVersion,
}

impl Display for OrderedVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.order, self.unordered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub version: Option<OrderedVersion>,
}

impl Display for Dependency {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

impl TryFrom<&str> for Dependency {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        for (token, order) in [
            (">=", DependencyOrder::GreaterOrEqual),
            ("<=", DependencyOrder::LessOrEqual),
            ("=", DependencyOrder::Equal),
            (">", DependencyOrder::Greater),
            ("<", DependencyOrder::Less),
        ] {
            if let Some((name, version)) = value.split_once(token) {
                return Ok(Self {
                    name: name.into(),
                    version: Some(OrderedVersion { order, unordered: version.try_into()? }),
                });
            }
        }
        Ok(Self { name: value.into(), version: None })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provide {
    pub name: String,
    pub version: Option<UnorderedVersion>,
}

impl Display for Provide {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}={}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

impl TryFrom<&str> for Provide {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        if value.contains('>') || value.contains('<') {
            return Err(Error::InvalidProvide(value.to_string()));
        }
        match value.split_once('=') {
            Some((name, version)) => Ok(Self { name: name.into(), version: Some(version.try_into()?) }),
            None => Ok(Self { name: value.into(), version: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> UnorderedVersion {
        UnorderedVersion::try_from(s).unwrap()
    }

    #[test]
    fn vercmp_compares_numeric_segments_numerically() {
        assert_eq!(v("1.9").vercmp(&v("1.10")), Ordering::Less);
        assert_eq!(v("1.0.0").vercmp(&v("1.0")), Ordering::Greater);
        assert_eq!(v("1.0").vercmp(&v("1.0")), Ordering::Equal);
    }

    #[test]
    fn vercmp_honors_epoch_first() {
        assert_eq!(v("1:1.0").vercmp(&v("2.0")), Ordering::Greater);
    }

    #[test]
    fn vercmp_includes_pkgrel() {
        assert_eq!(v("1.0-2").vercmp(&v("1.0-1")), Ordering::Greater);
    }

    #[test]
    fn dependency_parses_operator_and_version() {
        let dep = Dependency::try_from("glibc>=2.38").unwrap();
        assert_eq!(dep.name, "glibc");
        assert_eq!(dep.version.unwrap().order, DependencyOrder::GreaterOrEqual);
    }

    #[test]
    fn dependency_without_version() {
        let dep = Dependency::try_from("zlib").unwrap();
        assert!(dep.version.is_none());
    }

    #[test]
    fn provide_rejects_ordering_operators() {
        assert!(Provide::try_from("foo>1.0").is_err());
    }
}
