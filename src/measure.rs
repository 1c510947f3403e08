//! Geometry metrics for bracket slots, derived from the rendering
//! surface's em size.

use std::collections::HashMap;

use unicode_width::UnicodeWidthStr;

use crate::model::{Player, PlayerId};

pub struct BracketMetrics {
    /// One em in canvas units, as probed by the rendering surface.
    pub em: f64,
    /// Width of the name column. At least 12em, widened for long usernames.
    pub name_width: f64,
    /// Vertical gap inserted between round 0 and the later rounds.
    pub bracket_spacing: f64,
    pub bottom_padding: f64,
    pub left_padding: f64,
}

impl Default for BracketMetrics {
    fn default() -> Self {
        Self::new(16.0)
    }
}

impl BracketMetrics {
    pub fn new(em: f64) -> Self {
        Self {
            em,
            name_width: 12.0 * em,
            bracket_spacing: 75.0,
            bottom_padding: 3.0,
            left_padding: 5.0,
        }
    }

    /// Metrics with the name column sized to the widest username.
    pub fn with_players(em: f64, players: &HashMap<PlayerId, Player>) -> Self {
        let mut metrics = Self::new(em);
        let widest = players
            .values()
            .map(|p| UnicodeWidthStr::width(p.username.as_str()))
            .max()
            .unwrap_or(0);
        metrics.name_width = metrics.name_width.max(widest as f64 * 0.6 * em);
        metrics
    }

    /// Height of one match slot (two name rows).
    pub fn row_height(&self) -> f64 {
        2.5 * self.em
    }

    pub fn min_space(&self) -> f64 {
        0.5 * self.em
    }

    /// Vertical stride between freshly allocated rows.
    pub fn slot_height(&self) -> f64 {
        self.row_height() + self.min_space()
    }

    /// Horizontal stride between rounds.
    pub fn column_width(&self) -> f64 {
        self.name_width + 4.0 * self.em
    }

    /// Connector landing offsets inside a slot.
    pub fn em_4(&self) -> f64 {
        0.4 * self.em
    }

    pub fn em_6(&self) -> f64 {
        0.6 * self.em
    }
}
