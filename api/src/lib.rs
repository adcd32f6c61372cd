pub mod bigquery;
pub mod builder;
pub mod client;
pub mod credentials;
pub mod layout;
pub mod rows;
pub mod source;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub use builder::{BuildError, ConfigProblem};
pub use layout::{LayoutError, TournamentLayout};

/// Image shown for participants that are not decided yet.
pub const FALLBACK_LOGO: &str = "assets/images/fallback.png";

/// Default number of scorers kept for the leaderboard.
pub const DEFAULT_TOP_SCORERS: usize = 14;

pub fn team_logo(team_id: &str) -> String {
    format!("assets/images/team_logos/{team_id}.png")
}

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the warehouse row format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub group: String,
    /// Color tag from the layout's group table ("orange", "blue", ...).
    pub color: String,
    pub position: u32,
    pub logo: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Completed,
}

impl MatchStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "live" | "in_progress" => MatchStatus::Live,
            "completed" | "finished" | "played" | "final" => MatchStatus::Completed,
            _ => MatchStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

/// One side of a fixture. `team_id` is None while the slot still shows
/// placeholder text such as "Winner Match 13".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Participant {
    pub team_id: Option<String>,
    pub name: String,
    pub logo: String,
}

impl Participant {
    pub fn is_resolved(&self) -> bool {
        self.team_id.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    /// Bracket slot ("A1", "QF3", "Final").
    pub slot: String,
    pub match_number: u32,
    pub round_name: String,
    pub home: Participant,
    pub away: Participant,
    pub winner: Option<Side>,
    pub pitch: Option<String>,
    pub time: Option<String>,
    pub score: String,
    pub status: MatchStatus,
}

impl Match {
    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::Live
    }

    pub fn participants_resolved(&self) -> bool {
        self.home.is_resolved() && self.away.is_resolved()
    }

    pub fn winner(&self) -> Option<&Participant> {
        match self.winner? {
            Side::Home => Some(&self.home),
            Side::Away => Some(&self.away),
        }
    }

    pub fn fixture_label(&self) -> String {
        format!("{} vs {}", self.home.name, self.away.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub place: u32,
    pub name: String,
    pub team_id: String,
    pub goals: u32,
    pub logo: String,
}

// ---------------------------------------------------------------------------
// Snapshot: everything one view session reads, loaded once
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub layout: TournamentLayout,
    pub teams: BTreeMap<String, Team>,
    pub matches: BTreeMap<String, Match>,
    /// Leaderboard order as delivered by the source, already cut to the top N.
    pub players: Vec<Player>,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.get(id)
    }

    pub fn match_in_slot(&self, slot: &str) -> Option<&Match> {
        self.matches.get(slot)
    }

    /// Teams of one group ordered by standing position.
    pub fn teams_in_group(&self, group: &str) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.values().filter(|t| t.group == group).collect();
        teams.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        teams
    }

    /// Matches for the given slots, in the order the slots are listed.
    /// Slots without a fixture are skipped.
    pub fn matches_in_slots<'a>(&'a self, slots: &'a [String]) -> impl Iterator<Item = &'a Match> + 'a {
        slots.iter().filter_map(|slot| self.matches.get(slot))
    }

    /// Leaderboard split into the two display columns.
    pub fn scorer_columns(&self) -> (&[Player], &[Player]) {
        builder::split_scorers(&self.players)
    }
}
