use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::SameRustError;

/// Placeholder for any field the site did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Canonical order used for every schedule result.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Value of the `day` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    /// Capitalised name used as the key in schedule output.
    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub fn today() -> Self {
        Weekday::ALL[Local::now().weekday().num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = SameRustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();

        Weekday::ALL
            .into_iter()
            .find(|day| day.as_query() == wanted)
            .ok_or_else(|| SameRustError::InvalidWeekday(s.to_string()))
    }
}

impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One release slot from the schedule API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub title: String,
    pub url: String,
    pub cover_url: String,
    #[serde(rename = "type")]
    pub anime_type: String,
    pub score: String,
    pub genres: String,
    pub release_time: String,
}

impl ScheduleEntry {
    /// Projects one raw API item, defaulting every missing field to "N/A".
    pub fn from_item(item: &Value) -> Self {
        ScheduleEntry {
            title: project_field(item, "title"),
            url: project_field(item, "url"),
            cover_url: project_field(item, "featured_img_src"),
            anime_type: project_field(item, "east_type"),
            score: project_field(item, "east_score"),
            genres: project_field(item, "genre"),
            release_time: project_field(item, "east_time"),
        }
    }

    /// Projects a whole payload. Anything but an array is an empty day.
    pub fn from_payload(payload: &Value) -> Vec<Self> {
        payload
            .as_array()
            .map(|items| items.iter().map(ScheduleEntry::from_item).collect())
            .unwrap_or_default()
    }
}

fn project_field(item: &Value, key: &str) -> String {
    match item.get(key) {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// Per-day schedule keyed in the order the days were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleResult {
    days: Vec<(Weekday, Vec<ScheduleEntry>)>,
}

impl ScheduleResult {
    pub fn get(&self, day: Weekday) -> Option<&[ScheduleEntry]> {
        self.days
            .iter()
            .find(|(d, _)| *d == day)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[ScheduleEntry])> {
        self.days.iter().map(|(d, entries)| (*d, entries.as_slice()))
    }

    pub fn days(&self) -> Vec<Weekday> {
        self.days.iter().map(|(d, _)| *d).collect()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl From<Vec<(Weekday, Vec<ScheduleEntry>)>> for ScheduleResult {
    fn from(days: Vec<(Weekday, Vec<ScheduleEntry>)>) -> Self {
        ScheduleResult { days }
    }
}

// Written as a map so the JSON keys keep day order.
impl Serialize for ScheduleResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (day, entries) in &self.days {
            map.serialize_entry(day.name(), entries)?;
        }
        map.end()
    }
}

/// One card from the latest-episode listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LatestEpisode {
    pub title: String,
    pub episode: String,
    pub uploader: String,
    pub release_time: String,
    pub url: String,
    pub cover_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LatestPage {
    pub page: u32,
    pub episodes: Vec<LatestEpisode>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TopTenAnime {
    /// `None` when the badge is missing or not a number.
    pub rank: Option<u32>,
    pub title: String,
    pub score: String,
    pub url: String,
    pub cover_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MovieProject {
    pub title: String,
    pub url: String,
    pub release_date: String,
    pub genres: Vec<String>,
    pub cover_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HomeInfo {
    pub top_10: Vec<TopTenAnime>,
    pub latest_episodes: Vec<LatestEpisode>,
    pub movie_projects: Vec<MovieProject>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn weekday_parses_case_insensitively() {
        assert_eq!("MONDAY".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!(" sunday ".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert!(matches!(
            "funday".parse::<Weekday>(),
            Err(SameRustError::InvalidWeekday(_))
        ));
    }

    #[test]
    fn weekday_names_and_queries_line_up() {
        for day in Weekday::ALL {
            assert_eq!(day.name().to_lowercase(), day.as_query());
        }
        assert!(Weekday::ALL.contains(&Weekday::today()));
    }

    #[test]
    fn entry_maps_every_upstream_field() {
        let item = json!({
            "title": "X",
            "url": "/x",
            "featured_img_src": "/c.jpg",
            "east_type": "TV",
            "east_score": "8.1",
            "genre": "Action",
            "east_time": "10:00"
        });

        let entry = ScheduleEntry::from_item(&item);
        assert_eq!(
            entry,
            ScheduleEntry {
                title: "X".into(),
                url: "/x".into(),
                cover_url: "/c.jpg".into(),
                anime_type: "TV".into(),
                score: "8.1".into(),
                genres: "Action".into(),
                release_time: "10:00".into(),
            }
        );
    }

    #[test]
    fn missing_and_null_fields_become_sentinel() {
        let entry = ScheduleEntry::from_item(&json!({ "title": "Only", "east_score": null }));
        assert_eq!(entry.title, "Only");
        assert_eq!(entry.score, NOT_AVAILABLE);
        assert_eq!(entry.url, NOT_AVAILABLE);
        assert_eq!(entry.release_time, NOT_AVAILABLE);

        let value = serde_json::to_value(&entry).unwrap();
        for key in ["title", "url", "cover_url", "type", "score", "genres", "release_time"] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn non_string_fields_are_rendered() {
        let entry = ScheduleEntry::from_item(&json!({
            "east_score": 7.5,
            "genre": ["Action", "Drama"]
        }));
        assert_eq!(entry.score, "7.5");
        assert_eq!(entry.genres, "Action, Drama");
    }

    #[test]
    fn non_array_payload_is_empty() {
        assert!(ScheduleEntry::from_payload(&Value::Null).is_empty());
        assert!(ScheduleEntry::from_payload(&json!({ "message": "none" })).is_empty());
        assert_eq!(ScheduleEntry::from_payload(&json!([{}, {}])).len(), 2);
    }

    #[test]
    fn schedule_serializes_in_stored_order() {
        let result = ScheduleResult::from(vec![
            (Weekday::Sunday, vec![]),
            (Weekday::Monday, vec![]),
        ]);

        let text = serde_json::to_string(&result).unwrap();
        assert_eq!(text, r#"{"Sunday":[],"Monday":[]}"#);
        assert_eq!(result.get(Weekday::Monday), Some(&[][..]));
        assert_eq!(result.get(Weekday::Friday), None);
    }
}
