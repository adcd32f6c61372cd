/// Raw warehouse rows. Column names are the warehouse's contract and are kept
/// as-is. BigQuery hands every cell back as a string, local snapshot files use
/// JSON numbers, so numeric and id columns accept both.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureRow {
    pub round_name: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub group_name: Option<String>,
    #[serde(deserialize_with = "count")]
    pub match_id: u32,
    #[serde(default, deserialize_with = "opt_text")]
    pub home_team_id: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub home_team_name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub away_team_id: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub away_team_name: Option<String>,
    #[serde(default, deserialize_with = "opt_count")]
    pub home_team_goals: Option<u32>,
    #[serde(default, deserialize_with = "opt_count")]
    pub away_team_goals: Option<u32>,
    #[serde(default, deserialize_with = "opt_count")]
    pub home_team_penalty_goals: Option<u32>,
    #[serde(default, deserialize_with = "opt_count")]
    pub away_team_penalty_goals: Option<u32>,
    #[serde(default, deserialize_with = "opt_text")]
    pub pitch: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub match_time: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub match_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    #[serde(deserialize_with = "text")]
    pub team_id: String,
    pub team_name: String,
    pub group_name: String,
    #[serde(deserialize_with = "count")]
    pub group_position: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorerRow {
    #[serde(deserialize_with = "count")]
    pub place: u32,
    pub player_name: String,
    #[serde(deserialize_with = "text")]
    pub team_id: String,
    #[serde(deserialize_with = "count")]
    pub total_goals: u32,
}

/// The three datasets as they come out of the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTables {
    #[serde(default)]
    pub fixtures: Vec<FixtureRow>,
    #[serde(default)]
    pub standings: Vec<StandingRow>,
    #[serde(default)]
    pub scorers: Vec<ScorerRow>,
}

// ---------------------------------------------------------------------------
// Lenient cell decoding
// ---------------------------------------------------------------------------

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => match n.as_f64() {
            // pandas exports nullable integer columns as floats ("12.0")
            Some(f) if f.fract() == 0.0 && n.is_f64() => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn value_to_count(value: Value) -> Result<Option<u32>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).map(Some).map_err(|_| format!("{u} out of range"));
            }
            match n.as_f64() {
                Some(f) if f.is_nan() => Ok(None),
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => Ok(Some(f as u32)),
                _ => Err(format!("{n} is not a non-negative integer")),
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                return Ok(None);
            }
            if let Ok(u) = trimmed.parse::<u32>() {
                return Ok(Some(u));
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => Ok(Some(f as u32)),
                _ => Err(format!("{trimmed:?} is not a non-negative integer")),
            }
        }
        other => Err(format!("{other} is not a number")),
    }
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    value_to_text(Value::deserialize(d)?).ok_or_else(|| serde::de::Error::custom("value is null"))
}

fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(value_to_text(Value::deserialize(d)?))
}

fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    value_to_count(Value::deserialize(d)?)
        .map_err(serde::de::Error::custom)?
        .ok_or_else(|| serde::de::Error::custom("value is null"))
}

fn opt_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    value_to_count(Value::deserialize(d)?).map_err(serde::de::Error::custom)
}
