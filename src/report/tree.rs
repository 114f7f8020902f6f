//! Report entries and the nested detail tree.
//!
//! Field names follow the wire contract consumed by the stats service:
//! `Id`, `Pid`, `OriginalURL`, `ShortURL`, `SourceIP`, `TimeInterval`,
//! `Count`. `OriginalURL`/`ShortURL` are omitted when empty and `Pid` may be
//! null. A report node is `{ Count, Details }`, nested one level per
//! requested detail dimension, each node's count equal to the sum of its
//! contributing entries.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

/// One short-link record as it travels between the store and the stats
/// aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(rename = "Id")]
    pub id: i64,

    #[serde(rename = "Pid")]
    pub pid: Option<i64>,

    #[serde(rename = "OriginalURL", default, skip_serializing_if = "String::is_empty")]
    pub original_url: String,

    #[serde(rename = "ShortURL", default, skip_serializing_if = "String::is_empty")]
    pub short_url: String,

    #[serde(rename = "SourceIP")]
    pub source_ip: String,

    #[serde(rename = "TimeInterval")]
    pub time_interval: String,

    #[serde(rename = "Count")]
    pub count: i64,
}

/// The `SENDJSON` document: `{ "entries": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    pub entries: Vec<ReportEntry>,
}

/// One level of the nested aggregation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailReport {
    #[serde(rename = "Count", default)]
    pub count: i64,

    #[serde(
        rename = "Details",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub details: BTreeMap<String, DetailReport>,
}

impl DetailReport {
    fn child(&mut self, key: String) -> &mut DetailReport {
        self.details.entry(key).or_default()
    }
}

/// A grouping key for one level of the report tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    SourceIp,
    TimeInterval,
    Url,
}

impl Dimension {
    /// The node label an entry contributes under this dimension.
    fn label(&self, entry: &ReportEntry) -> String {
        match self {
            Dimension::SourceIp => entry.source_ip.clone(),
            Dimension::TimeInterval => entry.time_interval.clone(),
            Dimension::Url => format!("{} ({})", entry.original_url, entry.short_url),
        }
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SourceIP" => Ok(Dimension::SourceIp),
            "TimeInterval" => Ok(Dimension::TimeInterval),
            "URL" => Ok(Dimension::Url),
            other => Err(format!("unknown detail dimension '{}'", other)),
        }
    }
}

/// Builds the nested report tree over `entries`, one level per dimension in
/// `order`. Every entry contributes its count to the root and to each node
/// on its path.
pub fn build_tree(entries: &[ReportEntry], order: &[Dimension]) -> DetailReport {
    let mut root = DetailReport::default();

    for entry in entries {
        root.count += entry.count;

        let mut node = &mut root;
        for dim in order {
            node = node.child(dim.label(entry));
            node.count += entry.count;
        }
    }

    root
}

/// The hour bucket stamped on new short-link entries, e.g. "14:00-15:00".
pub fn current_interval() -> String {
    let hour = Local::now().hour();
    format!("{:02}:00-{:02}:00", hour, (hour + 1) % 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ip: &str, interval: &str, short: &str, orig: &str, count: i64) -> ReportEntry {
        ReportEntry {
            id: 0,
            pid: None,
            original_url: orig.into(),
            short_url: short.into(),
            source_ip: ip.into(),
            time_interval: interval.into(),
            count,
        }
    }

    #[test]
    fn test_entry_json_field_names() {
        let e = entry("10.0.0.1", "14:00-15:00", "ab12cd", "https://example.com", 3);
        let json = serde_json::to_value(&e).unwrap();

        assert_eq!(json["Id"], 0);
        assert_eq!(json["Pid"], serde_json::Value::Null);
        assert_eq!(json["OriginalURL"], "https://example.com");
        assert_eq!(json["ShortURL"], "ab12cd");
        assert_eq!(json["SourceIP"], "10.0.0.1");
        assert_eq!(json["TimeInterval"], "14:00-15:00");
        assert_eq!(json["Count"], 3);
    }

    #[test]
    fn test_empty_urls_are_omitted() {
        let e = entry("10.0.0.1", "14:00-15:00", "", "", 1);
        let json = serde_json::to_value(&e).unwrap();

        assert!(json.get("OriginalURL").is_none());
        assert!(json.get("ShortURL").is_none());
    }

    #[test]
    fn test_report_data_roundtrip() {
        let data = ReportData {
            entries: vec![entry("a", "b", "c", "d", 1), entry("e", "f", "", "", 2)],
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: ReportData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_dimension_parsing() {
        assert_eq!("SourceIP".parse::<Dimension>(), Ok(Dimension::SourceIp));
        assert_eq!(
            "TimeInterval".parse::<Dimension>(),
            Ok(Dimension::TimeInterval)
        );
        assert_eq!("URL".parse::<Dimension>(), Ok(Dimension::Url));
        assert!("Bogus".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_tree_groups_shared_source_ip() {
        // Two entries from the same IP: one top-level node whose count is
        // the sum of both entries' counts.
        let entries = vec![
            entry("10.0.0.1", "14:00-15:00", "aa", "https://a.example", 2),
            entry("10.0.0.1", "15:00-16:00", "bb", "https://b.example", 3),
        ];

        let order = [Dimension::SourceIp, Dimension::TimeInterval, Dimension::Url];
        let tree = build_tree(&entries, &order);

        assert_eq!(tree.count, 5);
        assert_eq!(tree.details.len(), 1);

        let ip_node = &tree.details["10.0.0.1"];
        assert_eq!(ip_node.count, 5);
        assert_eq!(ip_node.details.len(), 2);
        assert_eq!(ip_node.details["14:00-15:00"].count, 2);
        assert_eq!(
            ip_node.details["15:00-16:00"].details["https://b.example (bb)"].count,
            3
        );
    }

    #[test]
    fn test_tree_with_empty_order_is_flat() {
        let entries = vec![entry("a", "t", "s", "o", 1), entry("b", "t", "s", "o", 4)];
        let tree = build_tree(&entries, &[]);
        assert_eq!(tree.count, 5);
        assert!(tree.details.is_empty());
    }

    #[test]
    fn test_current_interval_shape() {
        let interval = current_interval();
        assert_eq!(interval.len(), 11);
        assert_eq!(&interval[2..6], ":00-");
    }
}
