use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One bookable time unit: a calendar date plus an hour of day.
/// Ordering is (date, hour), which the derive gives us from field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub date: NaiveDate,
    pub hour: u8,
}

impl Slot {
    pub fn new(date: NaiveDate, hour: u8) -> Self {
        Slot { date, hour }
    }

    /// The composite key stored in the database and sent over the wire,
    /// e.g. "2024-03-01:9". The hour is not zero-padded.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.date, self.hour)
    }
}

#[derive(Debug)]
pub struct ParseSlotError(pub String);

impl fmt::Display for ParseSlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid slot key: {}", self.0)
    }
}

impl std::error::Error for ParseSlotError {}

impl FromStr for Slot {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (date, hour) = s
            .split_once(':')
            .ok_or_else(|| ParseSlotError(s.to_string()))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ParseSlotError(s.to_string()))?;
        let hour: u8 = hour.parse().map_err(|_| ParseSlotError(s.to_string()))?;
        if hour > 23 {
            return Err(ParseSlotError(s.to_string()));
        }
        Ok(Slot { date, hour })
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Availability level a voter paints onto a slot. Absence of a rating
/// for a slot means the voter can't make it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Great,
    Good,
    Fine,
}

impl Rating {
    /// Ordinal weight used by the aggregation engine.
    pub fn weight(self) -> u32 {
        match self {
            Rating::Great => 3,
            Rating::Good => 2,
            Rating::Fine => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Great => "great",
            Rating::Good => "good",
            Rating::Fine => "fine",
        }
    }
}

impl FromStr for Rating {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "great" => Ok(Rating::Great),
            "good" => Ok(Rating::Good),
            "fine" => Ok(Rating::Fine),
            other => Err(ParseSlotError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRating {
    pub slot: Slot,
    pub rating: Rating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub voter_name: String,
    pub ratings: Vec<SlotRating>,
}

impl Vote {
    /// The voter's rating for one slot; `None` means unavailable.
    pub fn rating_for(&self, slot: Slot) -> Option<Rating> {
        self.ratings.iter().find(|r| r.slot == slot).map(|r| r.rating)
    }
}

#[derive(Debug, Serialize)]
pub struct Event {
    pub id: i64,
    pub public_id: String,
    #[serde(skip_serializing)]
    pub mod_key: String,
    pub name: String,
    pub description: String,
    /// Candidate slots, kept sorted ascending.
    pub slots: Vec<Slot>,
    #[serde(skip_serializing)]
    pub created_at: NaiveDateTime,
}
