//! The tournament layout: every static table the board depends on, kept in a
//! single versioned JSON resource. The embedded default can be replaced with
//! `TROPHY_LAYOUT_JSON` when the tournament geometry changes.

use crate::builder::{BuildError, ConfigProblem};
use crate::rows::{FixtureRow, StandingRow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

pub const LAYOUT_VERSION: u32 = 1;
const EMBEDDED_LAYOUT_JSON: &str = include_str!("../tournament_layout.json");

/// Neutral color for tags missing from the palette.
pub const NEUTRAL_COLOR: &str = "#CCCCCC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentLayout {
    pub version: u32,
    pub title: String,
    /// Color tag → hex.
    pub colors: BTreeMap<String, String>,
    /// Group label → color tag.
    pub group_colors: BTreeMap<String, String>,
    /// Groups shown in the group section, in display order.
    pub groups: Vec<String>,
    /// Rounds whose slot key ends with the match number.
    pub numbered_rounds: Vec<String>,
    /// Composite key → slot id.
    pub slots: BTreeMap<String, String>,
    /// Match number → names shown while participants are undecided.
    pub placeholders: BTreeMap<u32, PlaceholderNames>,
    pub schedule_days: Vec<ScheduleDay>,
    pub bracket: BracketLayout,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderNames {
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub title: String,
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketLayout {
    pub quarter_finals: Vec<QuarterFinalSlot>,
    pub semi_finals: Vec<String>,
    #[serde(rename = "final")]
    pub final_slot: String,
    pub third_place: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterFinalSlot {
    pub slot: String,
    /// Color tags for the home and away box.
    pub colors: [String; 2],
}

#[derive(Debug)]
pub enum LayoutError {
    Io(String),
    Parse(String),
    UnsupportedVersion(u32),
    Invalid(Vec<String>),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Io(msg) => write!(f, "layout could not be read: {msg}"),
            LayoutError::Parse(msg) => write!(f, "layout is not valid JSON: {msg}"),
            LayoutError::UnsupportedVersion(v) => {
                write!(f, "layout version {v} is not supported (expected {LAYOUT_VERSION})")
            }
            LayoutError::Invalid(problems) => {
                write!(f, "layout is inconsistent: {}", problems.join("; "))
            }
        }
    }
}

impl std::error::Error for LayoutError {}

impl TournamentLayout {
    /// The layout compiled into the binary.
    pub fn embedded() -> Result<Self, LayoutError> {
        Self::from_json(EMBEDDED_LAYOUT_JSON)
    }

    pub fn from_json(raw: &str) -> Result<Self, LayoutError> {
        let layout: TournamentLayout =
            serde_json::from_str(raw).map_err(|e| LayoutError::Parse(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_file(path: &Path) -> Result<Self, LayoutError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LayoutError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Internal consistency: slot ids are unique and every slot referenced by
    /// the schedule or the bracket exists.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.version != LAYOUT_VERSION {
            return Err(LayoutError::UnsupportedVersion(self.version));
        }

        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        for (key, slot) in &self.slots {
            if !seen.insert(slot.as_str()) {
                problems.push(format!("slot {slot:?} is mapped twice (again by key {key:?})"));
            }
        }

        let known_slot = |slot: &str| self.slots.values().any(|s| s == slot);
        for day in &self.schedule_days {
            for slot in &day.slots {
                if !known_slot(slot.as_str()) {
                    problems.push(format!("schedule day {:?} lists unknown slot {slot:?}", day.title));
                }
            }
        }

        let bracket = &self.bracket;
        let bracket_slots = bracket
            .quarter_finals
            .iter()
            .map(|qf| &qf.slot)
            .chain(bracket.semi_finals.iter())
            .chain([&bracket.final_slot, &bracket.third_place]);
        for slot in bracket_slots {
            if !known_slot(slot.as_str()) {
                problems.push(format!("bracket references unknown slot {slot:?}"));
            }
        }

        for group in &self.groups {
            if !self.group_colors.contains_key(group) {
                problems.push(format!("group {group:?} has no color"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(LayoutError::Invalid(problems))
        }
    }

    /// Composite lookup key for a fixture: round name, group name (empty when
    /// absent) and, for numbered rounds, the match number.
    pub fn slot_key(&self, round_name: &str, group_name: Option<&str>, match_number: u32) -> String {
        let mut key = format!("{round_name}{}", group_name.unwrap_or_default());
        if self.numbered_rounds.iter().any(|r| r == round_name) {
            key.push_str(&match_number.to_string());
        }
        key
    }

    pub fn slot_for(&self, round_name: &str, group_name: Option<&str>, match_number: u32) -> Option<&str> {
        self.slots
            .get(&self.slot_key(round_name, group_name, match_number))
            .map(String::as_str)
    }

    pub fn group_color(&self, group: &str) -> Option<&str> {
        self.group_colors.get(group).map(String::as_str)
    }

    pub fn placeholder(&self, match_number: u32) -> Option<&PlaceholderNames> {
        self.placeholders.get(&match_number)
    }

    /// Hex color for a tag, neutral gray when the tag is unknown.
    pub fn color_hex(&self, tag: &str) -> &str {
        self.colors.get(tag).map(String::as_str).unwrap_or(NEUTRAL_COLOR)
    }

    /// Checks incoming rows against the tables before any record is built and
    /// reports every mismatch at once.
    pub fn check_rows(&self, fixtures: &[FixtureRow], standings: &[StandingRow]) -> Result<(), BuildError> {
        let mut problems = Vec::new();

        for row in standings {
            if self.group_color(&row.group_name).is_none() {
                problems.push(ConfigProblem::UnmappedGroup {
                    team_id: row.team_id.clone(),
                    group: row.group_name.clone(),
                });
            }
        }

        let mut slots_taken: HashSet<&str> = HashSet::new();
        for row in fixtures {
            match self.slot_for(&row.round_name, row.group_name.as_deref(), row.match_id) {
                Some(slot) => {
                    if !slots_taken.insert(slot) {
                        problems.push(ConfigProblem::DuplicateSlot {
                            slot: slot.to_string(),
                            match_id: row.match_id,
                        });
                    }
                }
                None => problems.push(ConfigProblem::UnmappedSlot {
                    key: self.slot_key(&row.round_name, row.group_name.as_deref(), row.match_id),
                    match_id: row.match_id,
                }),
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(BuildError { problems })
        }
    }
}
