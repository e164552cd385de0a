//! Engine version normalization
//!
//! Engines report versions such as `5.7.22-log`, `10.4.7-MariaDB` or
//! `5.7.25-TiDB-v6.5.0`. Only the leading `major.minor.patch` triple takes
//! part in comparisons; the rest is kept verbatim as an opaque suffix.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::UnrecognizedVersionFormat;

/// Leading three-part numeric version
static VERSION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+").expect("valid regex"));

/// Split a raw version into its canonical numeric prefix and vendor suffix.
///
/// ```
/// use sqladvisor_core::version::parse_version;
///
/// let (canonical, suffix) = parse_version("5.7.22-log").unwrap();
/// assert_eq!(canonical, "5.7.22");
/// assert_eq!(suffix, "-log");
/// ```
pub fn parse_version(raw: &str) -> Result<(String, String), UnrecognizedVersionFormat> {
    let found = VERSION_PREFIX
        .find(raw)
        .ok_or_else(|| UnrecognizedVersionFormat {
            raw: raw.to_string(),
        })?;
    Ok((
        raw[..found.end()].to_string(),
        raw[found.end()..].to_string(),
    ))
}

/// A normalized engine version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    suffix: String,
}

impl EngineVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: String::new(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, UnrecognizedVersionFormat> {
        let (canonical, suffix) = parse_version(raw)?;
        let unrecognized = || UnrecognizedVersionFormat {
            raw: raw.to_string(),
        };

        let mut parts = canonical.split('.').map(str::parse::<u64>);
        let mut next = || parts.next().and_then(Result::ok).ok_or_else(unrecognized);
        let (major, minor, patch) = (next()?, next()?, next()?);

        Ok(Self {
            major,
            minor,
            patch,
            suffix,
        })
    }

    /// Vendor suffix, exactly as reported
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The canonical `major.minor.patch` form
    pub fn canonical(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// Compare numeric parts only; the suffix never takes part
    pub fn cmp_numeric(&self, other: &EngineVersion) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }

    pub fn at_least(&self, minimum: &EngineVersion) -> bool {
        self.cmp_numeric(minimum) != Ordering::Less
    }

    /// Parse a release version embedded in the suffix after `marker`.
    ///
    /// TiDB reports a MySQL-compatible version followed by its own release,
    /// e.g. `5.7.25-TiDB-v6.5.0` yields `6.5.0` for the marker `-TiDB-v`.
    pub fn embedded_release(&self, marker: &str) -> Option<EngineVersion> {
        let start = self.suffix.find(marker)? + marker.len();
        EngineVersion::parse(&self.suffix[start..]).ok()
    }
}

impl std::fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}{}", self.major, self.minor, self.patch, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_version() {
        let cases = [
            ("8.0.27", "8.0.27", ""),
            ("5.7.22-log", "5.7.22", "-log"),
            ("5.6.29_ddm_3.0.1.7", "5.6.29", "_ddm_3.0.1.7"),
            ("10.4.7-MariaDB", "10.4.7", "-MariaDB"),
            ("8.0.27.1", "8.0.27", ".1"),
        ];

        for (raw, want, want_rest) in cases {
            let (version, rest) = parse_version(raw).unwrap();
            assert_eq!(version, want, "canonical of {}", raw);
            assert_eq!(rest, want_rest, "suffix of {}", raw);
        }
    }

    #[test]
    fn test_parse_version_rejects_missing_triple() {
        for raw in ["", "8.0", "v8.0.27", "MariaDB-10.4.7", "8.x.1"] {
            let err = parse_version(raw).unwrap_err();
            assert_eq!(err.raw, raw);
        }
    }

    #[test]
    fn test_engine_version_compares_numerically() {
        let old = EngineVersion::parse("5.7.22-log").unwrap();
        let new = EngineVersion::parse("8.0.17").unwrap();
        let newer = EngineVersion::parse("8.0.100-custom").unwrap();

        assert!(!old.at_least(&new));
        assert!(new.at_least(&new));
        assert!(newer.at_least(&new));
        assert_eq!(newer.suffix(), "-custom");
        assert_eq!(newer.canonical(), "8.0.100");
        assert_eq!(newer.to_string(), "8.0.100-custom");
    }

    #[test]
    fn test_suffix_does_not_affect_comparison() {
        let plain = EngineVersion::parse("10.4.7").unwrap();
        let vendor = EngineVersion::parse("10.4.7-MariaDB").unwrap();
        assert_eq!(plain.cmp_numeric(&vendor), Ordering::Equal);
        assert_ne!(plain, vendor);
    }

    #[test]
    fn test_overflowing_component_is_unrecognized() {
        assert!(EngineVersion::parse("99999999999999999999999.0.1").is_err());
    }

    #[test]
    fn test_embedded_release() {
        let tidb = EngineVersion::parse("5.7.25-TiDB-v6.5.0").unwrap();
        assert_eq!(
            tidb.embedded_release("-TiDB-v"),
            Some(EngineVersion::new(6, 5, 0))
        );
        assert_eq!(tidb.embedded_release("-MariaDB"), None);
    }
}
