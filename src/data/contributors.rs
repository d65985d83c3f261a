//! Geocoded contributor records.
//!
//! The records are produced offline by the fetch/geocode scripts and are
//! treated as immutable input by the map. Field names follow the JSON file
//! those scripts emit.

use anyhow::Context;
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Commits are weighted above issues when ranking contributors.
pub const COMMIT_WEIGHT: u64 = 3;
pub const ISSUE_WEIGHT: u64 = 1;

/// Label used when a contributor's country could not be resolved.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// A latitude/longitude pair in degrees, as stored in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Converts to a `geo_types` coordinate (x = longitude, y = latitude).
    pub fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }
}

/// One contributor with an (optionally) resolved geolocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorLocation {
    /// GitHub login, unique per contributor
    pub login: String,
    /// Display name (may be missing or empty)
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text location from the profile
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "avatar_url")]
    pub avatar_url: String,
    #[serde(default, rename = "html_url")]
    pub html_url: String,
    #[serde(default)]
    pub commit_count: u32,
    #[serde(default)]
    pub issue_count: u32,
    /// Resolved coordinates; `None` when geocoding failed
    #[serde(default, rename = "coords")]
    pub coordinates: Option<LatLng>,
    /// Resolved country name
    #[serde(default)]
    pub country: Option<String>,
}

impl ContributorLocation {
    /// Creates a contributor with coordinates and counts, leaving the
    /// profile fields empty.
    #[cfg(test)]
    pub fn new(login: &str, lat: f64, lng: f64, commit_count: u32, issue_count: u32) -> Self {
        Self {
            login: login.to_string(),
            name: None,
            location: None,
            avatar_url: String::new(),
            html_url: String::new(),
            commit_count,
            issue_count,
            coordinates: Some(LatLng::new(lat, lng)),
            country: None,
        }
    }

    #[cfg(test)]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    #[cfg(test)]
    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    /// Name shown on the map: the profile name, falling back to the login.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.login,
        }
    }

    /// Total number of contributions (commits + issues).
    pub fn contributions(&self) -> u64 {
        u64::from(self.commit_count) + u64::from(self.issue_count)
    }

    /// Weighted ranking score. Widened so the largest counts cannot overflow.
    pub fn score(&self) -> u64 {
        u64::from(self.commit_count) * COMMIT_WEIGHT + u64::from(self.issue_count) * ISSUE_WEIGHT
    }

    pub fn country_or_unknown(&self) -> &str {
        self.country.as_deref().unwrap_or(UNKNOWN_COUNTRY)
    }

    pub fn is_geocoded(&self) -> bool {
        self.coordinates.is_some()
    }
}

/// Parses the geocoded contributor JSON array.
pub fn parse_contributors(json: &str) -> anyhow::Result<Vec<ContributorLocation>> {
    serde_json::from_str(json).context("failed to parse contributor locations")
}

/// Reads and parses a contributor JSON file.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_contributors(path: &std::path::Path) -> anyhow::Result<Vec<ContributorLocation>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_contributors(&json)
}

/// Orders contributors by weighted score, highest first. Equal scores keep
/// their original relative order.
pub fn sort_by_score(contributors: &mut [ContributorLocation]) {
    contributors.sort_by(|a, b| b.score().cmp(&a.score()));
}

/// Aggregate numbers for one country in the legend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryStat {
    pub country: String,
    pub count: usize,
    pub contributions: u64,
}

/// Per-country member counts over geocoded contributors, largest first.
///
/// Ties keep the order in which the countries first appear.
pub fn country_stats(contributors: &[ContributorLocation]) -> Vec<CountryStat> {
    let mut stats: Vec<CountryStat> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for contributor in contributors.iter().filter(|c| c.is_geocoded()) {
        let country = contributor.country_or_unknown();
        let slot = *index.entry(country).or_insert_with(|| {
            stats.push(CountryStat {
                country: country.to_string(),
                count: 0,
                contributions: 0,
            });
            stats.len() - 1
        });
        stats[slot].count += 1;
        stats[slot].contributions += contributor.contributions();
    }

    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "login": "alice",
            "name": "Alice",
            "location": "Berlin, Germany",
            "avatar_url": "https://example.com/a.png",
            "html_url": "https://github.com/alice",
            "commitCount": 10,
            "issueCount": 2,
            "coords": { "lat": 52.52, "lng": 13.405 },
            "country": "Germany"
        },
        {
            "login": "bob",
            "name": null,
            "location": null,
            "avatar_url": "",
            "html_url": "",
            "commitCount": 0,
            "issueCount": 5,
            "coords": null,
            "country": null
        }
    ]"#;

    #[test]
    fn test_parse_contributors() {
        let contributors = parse_contributors(SAMPLE).unwrap();
        assert_eq!(contributors.len(), 2);

        let alice = &contributors[0];
        assert_eq!(alice.commit_count, 10);
        assert_eq!(alice.issue_count, 2);
        assert_eq!(alice.coordinates, Some(LatLng::new(52.52, 13.405)));
        assert_eq!(alice.country.as_deref(), Some("Germany"));

        let bob = &contributors[1];
        assert!(!bob.is_geocoded());
        assert_eq!(bob.display_name(), "bob");
        assert_eq!(bob.country_or_unknown(), UNKNOWN_COUNTRY);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(parse_contributors("{ not json").is_err());
    }

    #[test]
    fn test_display_name_skips_blank_names() {
        let c = ContributorLocation::new("carol", 0.0, 0.0, 1, 0).with_name("  ");
        assert_eq!(c.display_name(), "carol");
    }

    #[test]
    fn test_sort_by_score_is_stable() {
        let mut contributors = vec![
            ContributorLocation::new("issues", 0.0, 0.0, 0, 6),
            ContributorLocation::new("commits", 0.0, 0.0, 3, 0),
            ContributorLocation::new("top", 0.0, 0.0, 5, 1),
            ContributorLocation::new("tied", 0.0, 0.0, 2, 3),
        ];
        sort_by_score(&mut contributors);

        let logins: Vec<&str> = contributors.iter().map(|c| c.login.as_str()).collect();
        // scores: issues=6, commits=9, top=16, tied=9
        assert_eq!(logins, vec!["top", "commits", "tied", "issues"]);
    }

    #[test]
    fn test_counts_at_the_u32_limit() {
        let c = ContributorLocation::new("bot", 0.0, 0.0, u32::MAX, u32::MAX);
        assert_eq!(c.contributions(), 2 * u64::from(u32::MAX));
        assert_eq!(c.score(), 4 * u64::from(u32::MAX));

        let mut contributors = vec![
            ContributorLocation::new("human", 0.0, 0.0, 40, 2),
            ContributorLocation::new("issues", 0.0, 0.0, 0, u32::MAX),
            c,
        ];
        sort_by_score(&mut contributors);
        let logins: Vec<&str> = contributors.iter().map(|c| c.login.as_str()).collect();
        assert_eq!(logins, vec!["bot", "issues", "human"]);
    }

    #[test]
    fn test_country_stats() {
        let mut ungeocoded = ContributorLocation::new("ghost", 0.0, 0.0, 9, 9);
        ungeocoded.coordinates = None;

        let contributors = vec![
            ContributorLocation::new("a", 48.8, 2.3, 1, 1).with_country("France"),
            ContributorLocation::new("b", 52.5, 13.4, 4, 0).with_country("Germany"),
            ContributorLocation::new("c", 50.1, 8.6, 2, 2).with_country("Germany"),
            ContributorLocation::new("d", 0.0, 0.0, 1, 0),
            ungeocoded,
        ];

        let stats = country_stats(&contributors);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].country, "Germany");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].contributions, 8);
        // France and Unknown tie on count; first appearance wins
        assert_eq!(stats[1].country, "France");
        assert_eq!(stats[2].country, UNKNOWN_COUNTRY);
    }
}
