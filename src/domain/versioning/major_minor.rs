//! `MAJOR.MINOR` versioning
//!
//! Versions are two decimal counters without leading zeros. Queries may give
//! only the major number, which resolves to the highest minor of that major.

use std::cmp::Ordering;

use crate::domain::value_objects::{Version, VersionQuery};

use super::{VersionError, VersioningSystem};

const NAME: &str = "major_minor";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MajorMinorVersioning;

impl MajorMinorVersioning {
    /// Split a complete version into its counters
    pub fn parse(&self, token: &str) -> Result<(u64, u64), VersionError> {
        let (major, minor) = token
            .split_once('.')
            .ok_or_else(|| VersionError::invalid(NAME, token, "expected MAJOR.MINOR"))?;
        Ok((parse_number(token, major)?, parse_number(token, minor)?))
    }

    /// Major component of any version, used for partial matching
    pub fn major_of(&self, version: &Version) -> Option<u64> {
        self.parse(version.as_str()).ok().map(|(major, _)| major)
    }
}

fn parse_number(token: &str, part: &str) -> Result<u64, VersionError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::invalid(
            NAME,
            token,
            format!("'{}' is not a number", part),
        ));
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(VersionError::invalid(
            NAME,
            token,
            format!("'{}' has a leading zero", part),
        ));
    }
    part.parse()
        .map_err(|_| VersionError::invalid(NAME, token, format!("'{}' is too large", part)))
}

impl VersioningSystem for MajorMinorVersioning {
    fn name(&self) -> &'static str {
        NAME
    }

    fn initial_version(&self) -> Version {
        Version::new("0.0")
    }

    fn next_version(&self, current: &Version, bump_major: bool) -> Result<Version, VersionError> {
        let (major, minor) = self.parse(current.as_str())?;
        let (major, minor) = if bump_major {
            (major + 1, 0)
        } else {
            (major, minor + 1)
        };
        Ok(Version::new(format!("{}.{}", major, minor)))
    }

    fn compare(&self, a: &Version, b: &Version) -> Ordering {
        // Malformed tokens sort below every valid version, among themselves
        // by text, so the order stays total.
        match (self.parse(a.as_str()), self.parse(b.as_str())) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            (Ok(_), Err(_)) => Ordering::Greater,
            (Err(_), Ok(_)) => Ordering::Less,
            (Err(_), Err(_)) => a.as_str().cmp(b.as_str()),
        }
    }

    fn is_valid(&self, token: &str) -> bool {
        self.parse(token).is_ok()
    }

    fn parse_query(&self, token: Option<&str>) -> Result<VersionQuery, VersionError> {
        let Some(token) = token else {
            return Ok(VersionQuery::Unspecified);
        };
        if token.contains('.') {
            self.parse(token)?;
            Ok(VersionQuery::Exact(Version::new(token)))
        } else {
            parse_number(token, token)?;
            Ok(VersionQuery::Partial(token.to_string()))
        }
    }

    fn matches(&self, version: &Version, query: &VersionQuery) -> bool {
        match query {
            VersionQuery::Unspecified => self.is_valid(version.as_str()),
            VersionQuery::Partial(major) => self
                .major_of(version)
                .is_some_and(|m| major.parse::<u64>() == Ok(m)),
            VersionQuery::Exact(exact) => exact == version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn versions(tokens: &[&str]) -> Vec<Version> {
        tokens.iter().map(|t| Version::new(*t)).collect()
    }

    #[test]
    fn initial_version_is_zero_zero() {
        assert_eq!(MajorMinorVersioning.initial_version(), Version::new("0.0"));
    }

    #[test]
    fn next_version_bumps_minor_or_major() {
        let mm = MajorMinorVersioning;
        assert_eq!(
            mm.next_version(&Version::new("0.0"), false).unwrap(),
            Version::new("0.1")
        );
        assert_eq!(
            mm.next_version(&Version::new("0.9"), false).unwrap(),
            Version::new("0.10")
        );
        assert_eq!(
            mm.next_version(&Version::new("1.7"), true).unwrap(),
            Version::new("2.0")
        );
    }

    #[test]
    fn next_version_rejects_malformed_current() {
        assert!(MajorMinorVersioning
            .next_version(&Version::new("abc"), false)
            .is_err());
    }

    #[test]
    fn compare_is_numeric_not_lexicographic() {
        let mm = MajorMinorVersioning;
        assert_eq!(
            mm.compare(&Version::new("0.10"), &Version::new("0.9")),
            Ordering::Greater
        );
        assert_eq!(
            mm.compare(&Version::new("10.0"), &Version::new("9.99")),
            Ordering::Greater
        );
        assert_eq!(
            mm.compare(&Version::new("abc"), &Version::new("0.0")),
            Ordering::Less
        );
    }

    #[test]
    fn validity() {
        let mm = MajorMinorVersioning;
        assert!(mm.is_valid("0.0"));
        assert!(mm.is_valid("12.345"));
        assert!(!mm.is_valid("abc"));
        assert!(!mm.is_valid("1"));
        assert!(!mm.is_valid("1."));
        assert!(!mm.is_valid(".1"));
        assert!(!mm.is_valid("1.2.3"));
        assert!(!mm.is_valid("01.2"));
        assert!(!mm.is_valid("-1.2"));
    }

    #[test]
    fn parse_query_forms() {
        let mm = MajorMinorVersioning;
        assert_eq!(mm.parse_query(None).unwrap(), VersionQuery::Unspecified);
        assert_eq!(
            mm.parse_query(Some("1")).unwrap(),
            VersionQuery::Partial("1".to_string())
        );
        assert_eq!(
            mm.parse_query(Some("1.2")).unwrap(),
            VersionQuery::Exact(Version::new("1.2"))
        );
        let err = mm.parse_query(Some("abc")).unwrap_err();
        assert!(err.to_string().contains("abc"));
        assert!(mm.parse_query(Some("1.x")).is_err());
    }

    #[test]
    fn completeness() {
        let mm = MajorMinorVersioning;
        assert!(mm.is_complete(&mm.parse_query(Some("1.2")).unwrap()));
        assert!(!mm.is_complete(&mm.parse_query(Some("1")).unwrap()));
        assert!(!mm.is_complete(&VersionQuery::Unspecified));
    }

    #[test]
    fn latest_matching_partial_and_unspecified() {
        let mm = MajorMinorVersioning;
        let all = versions(&["2.0", "1.2", "1.0", "0.1"]);

        assert_eq!(
            mm.latest_matching(&all, &VersionQuery::Partial("1".into())),
            Some(Version::new("1.2"))
        );
        assert_eq!(
            mm.latest_matching(&all, &VersionQuery::Unspecified),
            Some(Version::new("2.0"))
        );
        assert_eq!(
            mm.latest_matching(&all, &VersionQuery::Partial("3".into())),
            None
        );
        assert_eq!(
            mm.latest_matching(&all, &VersionQuery::Exact(Version::new("1.1"))),
            None
        );
    }

    #[test]
    fn partial_major_does_not_match_prefix_of_other_major() {
        let mm = MajorMinorVersioning;
        let all = versions(&["10.0", "1.3"]);
        assert_eq!(
            mm.latest_matching(&all, &VersionQuery::Partial("1".into())),
            Some(Version::new("1.3"))
        );
    }

    #[test]
    fn sort_versions_latest_first() {
        let mm = MajorMinorVersioning;
        let mut all = versions(&["0.1", "1.0", "0.10", "1.2", "2.0", "0.0"]);
        mm.sort_versions(&mut all);
        assert_eq!(all, versions(&["2.0", "1.2", "1.0", "0.10", "0.1", "0.0"]));
    }

    proptest! {
        #[test]
        fn compare_matches_tuple_order(a in 0u64..1000, b in 0u64..1000, c in 0u64..1000, d in 0u64..1000) {
            let mm = MajorMinorVersioning;
            let left = Version::new(format!("{}.{}", a, b));
            let right = Version::new(format!("{}.{}", c, d));
            prop_assert_eq!(mm.compare(&left, &right), (a, b).cmp(&(c, d)));
            prop_assert_eq!(mm.compare(&right, &left), (c, d).cmp(&(a, b)));
        }

        #[test]
        fn next_version_is_strictly_greater(a in 0u64..10_000, b in 0u64..10_000, bump in any::<bool>()) {
            let mm = MajorMinorVersioning;
            let current = Version::new(format!("{}.{}", a, b));
            let next = mm.next_version(&current, bump).unwrap();
            prop_assert!(mm.is_valid(next.as_str()));
            prop_assert_eq!(mm.compare(&next, &current), Ordering::Greater);
        }

        #[test]
        fn parse_roundtrips_canonical_tokens(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let token = format!("{}.{}", a, b);
            prop_assert_eq!(MajorMinorVersioning.parse(&token).unwrap(), (a, b));
        }
    }
}
