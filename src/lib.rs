pub mod bracket;
pub mod group;
pub mod layout;
pub mod measure;
pub mod model;
pub mod normalize;
pub mod rank;

use wasm_bindgen::prelude::*;

use bracket::BracketGraph;
use layout::LayoutEngine;
use measure::BracketMetrics;
use model::TournamentType;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Partition one round's matches into display groups
#[wasm_bindgen(js_name = "groupRound")]
pub fn group_round(round: &str, players: &str) -> Result<String, String> {
    let round = model::parse_round(round).map_err(|e| e.to_string())?;
    let players = model::parse_players(players).map_err(|e| e.to_string())?;

    let grouped = group::groupify(&round, &players);

    serde_json::to_string(&grouped).map_err(|e| e.to_string())
}

/// Build and lay out the elimination tree for a full tournament
#[wasm_bindgen(js_name = "layoutBracket")]
pub fn layout_bracket(
    rounds: &str,
    players: &str,
    tournament_type: &str,
    em: Option<f64>,
) -> Result<String, String> {
    let ttype = TournamentType::from_str(tournament_type)
        .ok_or_else(|| format!("Unknown tournament type: {tournament_type}"))?;
    if !ttype.is_elimination() {
        return Err(format!("Not an elimination tournament: {tournament_type}"));
    }

    let mut rounds = model::parse_rounds(rounds).map_err(|e| e.to_string())?;
    model::trim_trailing_empty_rounds(&mut rounds, ttype);
    let players = model::parse_players(players).map_err(|e| e.to_string())?;

    let graph = BracketGraph::build(&rounds);
    let metrics = BracketMetrics::with_players(em.unwrap_or(16.0), &players);
    let layout = LayoutEngine::new(metrics).layout(&graph, &players);

    serde_json::to_string(&layout).map_err(|e| e.to_string())
}
