//! Input data model: tournaments, rounds, matches and players.
//!
//! These records arrive as JSON from the data-fetch layer. The `players`
//! map may lag behind the latest rounds fetch, so every consumer treats a
//! missing player record as renderable-but-blank rather than an error.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

pub type PlayerId = u32;
pub type GameId = u64;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown tournament type: {0}")]
    UnknownTournamentType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentType {
    McMahon,
    SimultaneousMcMahon,
    RoundRobin,
    Swiss,
    Elimination,
    DoubleElimination,
    OpenGotha,
}

impl TournamentType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mcmahon" => Some(Self::McMahon),
            "s_mcmahon" => Some(Self::SimultaneousMcMahon),
            "roundrobin" => Some(Self::RoundRobin),
            "swiss" => Some(Self::Swiss),
            "elimination" => Some(Self::Elimination),
            "double_elimination" => Some(Self::DoubleElimination),
            "opengotha" => Some(Self::OpenGotha),
            _ => None,
        }
    }

    /// Elimination formats render as bracket trees, everything else as
    /// grouped match tables.
    pub fn is_elimination(&self) -> bool {
        matches!(self, Self::Elimination | Self::DoubleElimination)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub black: PlayerId,
    pub white: PlayerId,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub game_id: GameId,
}

impl Match {
    /// First character of the result string, the winner-color code.
    /// `None` for unplayed matches and empty result strings.
    pub fn result_prefix(&self) -> Option<char> {
        self.result.as_deref().and_then(|r| r.chars().next())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub byes: Vec<PlayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rank: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ranking: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub points: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sos: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sodos: f64,
}

/// Score fields arrive as numbers or numeric strings depending on the
/// server endpoint. Unparseable strings decode as 0.
fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    Ok(match NumOrStr::deserialize(de)? {
        NumOrStr::Num(n) => n,
        NumOrStr::Str(s) => s.parse().unwrap_or(0.0),
    })
}

/// Full tournament payload as consumed by the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct TournamentData {
    pub tournament_type: String,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub players: HashMap<PlayerId, Player>,
}

pub fn parse_round(json: &str) -> Result<Round, ModelError> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_rounds(json: &str) -> Result<Vec<Round>, ModelError> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_players(json: &str) -> Result<HashMap<PlayerId, Player>, ModelError> {
    Ok(serde_json::from_str(json)?)
}

/// The server can produce empty trailing rounds; drop them before building
/// anything. OpenGotha rounds are scheduled up front and stay as-is.
pub fn trim_trailing_empty_rounds(rounds: &mut Vec<Round>, tournament_type: TournamentType) {
    if tournament_type == TournamentType::OpenGotha {
        return;
    }
    while rounds.last().is_some_and(|r| r.matches.is_empty()) {
        rounds.pop();
    }
}
