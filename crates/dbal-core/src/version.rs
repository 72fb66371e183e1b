//! Server version reported by `get_version`.

use std::fmt;

use crate::error::{Error, Result, SchemaErrorKind};

/// A database server version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Driver that reported the version
    pub driver: String,
}

fn numeric_part(part: &str) -> u64 {
    let digits: String = part
        .trim()
        .trim_start_matches('0')
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

impl Version {
    /// Parse a dotted version string such as `8.0.26-log` or `14.2 (Debian)`.
    ///
    /// Missing components default to zero.
    pub fn parse(driver: &str, raw: &str) -> Result<Self> {
        let head = raw.split_whitespace().next().unwrap_or_default();
        let parts: Vec<&str> = head.split('.').collect();
        if parts.first().is_none_or(|p| !p.trim().starts_with(|c: char| c.is_ascii_digit())) {
            return Err(Error::schema(
                SchemaErrorKind::Invalid,
                format!("Can't parse the version: {}", raw),
            ));
        }
        Ok(Self {
            major: numeric_part(parts[0]),
            minor: parts.get(1).map_or(0, |p| numeric_part(p)),
            patch: parts.get(2).map_or(0, |p| numeric_part(p)),
            driver: driver.to_string(),
        })
    }

    /// Parse a HANA `M_DATABASE.VERSION` string (`2.00.048.00.1591276203`).
    ///
    /// Major, SPS and patch live in components 0, 2 and 4.
    pub fn parse_hana(driver: &str, raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split('.').collect();
        if parts.len() < 5 {
            return Err(Error::schema(
                SchemaErrorKind::Invalid,
                format!("Can't parse the version: {}", raw),
            ));
        }
        Ok(Self {
            major: numeric_part(parts[0]),
            minor: numeric_part(parts[2]),
            patch: numeric_part(parts[4]),
            driver: driver.to_string(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mysql() {
        let v = Version::parse("mysql", "8.0.26-log").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (8, 0, 26));
        assert_eq!(v.driver, "mysql");
    }

    #[test]
    fn test_parse_postgres_short() {
        let v = Version::parse("postgres", "14.2 (Debian 14.2-1.pgdg110+1)").unwrap();
        assert_eq!(v.to_string(), "14.2.0");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Version::parse("sqlite3", "unknown").is_err());
    }

    #[test]
    fn test_parse_hana() {
        let v = Version::parse_hana("hdb", "2.00.048.00.1591276203").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (2, 48, 1_591_276_203));
        assert!(Version::parse_hana("hdb", "2.00.048").is_err());
    }
}
