use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Teaching days of the weekly grid, in grid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
        }
    }
}

impl FromStr for Day {
    type Err = SlotParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "Mon" => Ok(Day::Mon),
            "Tue" => Ok(Day::Tue),
            "Wed" => Ok(Day::Wed),
            "Thu" => Ok(Day::Thu),
            "Fri" => Ok(Day::Fri),
            other => Err(SlotParseError::UnknownDay(other.to_string())),
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Teaching periods of the weekly grid, in grid order. Labels keep the
/// institution's 12-hour convention, so `1:00` and `2:00` are afternoon
/// periods following `12:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Nine,
    Ten,
    Eleven,
    Twelve,
    One,
    Two,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Nine,
        Period::Ten,
        Period::Eleven,
        Period::Twelve,
        Period::One,
        Period::Two,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Nine => "9:00",
            Period::Ten => "10:00",
            Period::Eleven => "11:00",
            Period::Twelve => "12:00",
            Period::One => "1:00",
            Period::Two => "2:00",
        }
    }
}

impl FromStr for Period {
    type Err = SlotParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "9:00" => Ok(Period::Nine),
            "10:00" => Ok(Period::Ten),
            "11:00" => Ok(Period::Eleven),
            "12:00" => Ok(Period::Twelve),
            "1:00" => Ok(Period::One),
            "2:00" => Ok(Period::Two),
            other => Err(SlotParseError::UnknownPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (day, period) coordinate in the fixed weekly grid.
///
/// The textual form is `Day-Period` (for example `Mon-9:00`), matching the
/// keys the grid is exchanged under. Day labels contain no `-`, so parsing
/// splits on the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub day: Day,
    pub period: Period,
}

impl SlotKey {
    pub fn new(day: Day, period: Period) -> Self {
        Self { day, period }
    }

    /// All fixed slot keys, day-major, in grid order.
    pub fn all() -> impl Iterator<Item = SlotKey> {
        Day::ALL
            .into_iter()
            .flat_map(|day| Period::ALL.into_iter().map(move |period| SlotKey { day, period }))
    }

    /// Number of slots in the fixed grid.
    pub const COUNT: usize = Day::ALL.len() * Period::ALL.len();
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day, self.period)
    }
}

impl FromStr for SlotKey {
    type Err = SlotParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (day, period) = trimmed
            .split_once('-')
            .ok_or_else(|| SlotParseError::MalformedKey(trimmed.to_string()))?;
        Ok(SlotKey {
            day: day.parse()?,
            period: period.parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotParseError {
    UnknownDay(String),
    UnknownPeriod(String),
    MalformedKey(String),
}

impl fmt::Display for SlotParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotParseError::UnknownDay(value) => write!(f, "unknown day '{value}'"),
            SlotParseError::UnknownPeriod(value) => write!(f, "unknown period '{value}'"),
            SlotParseError::MalformedKey(value) => {
                write!(f, "malformed slot key '{value}' (expected Day-Period)")
            }
        }
    }
}

impl std::error::Error for SlotParseError {}

macro_rules! string_serde {
    ($ty:ty, $expecting:literal) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse()
                    .map_err(|err| de::Error::custom(format!("expected {}: {err}", $expecting)))
            }
        }
    };
}

string_serde!(Day, "a teaching day such as Mon");
string_serde!(Period, "a period label such as 9:00");
string_serde!(SlotKey, "a slot key such as Mon-9:00");
