use super::state::WorkerRunState;
use crate::config::EngineConfig;
use crate::model::{LocationId, WorkDay};

/// Score d'une affectation candidate (plus haut = meilleur). Fonction pure de l'état.
///
/// - équité : `-fairness × assigned / max_hours` (`max_hours == 0` ⇒ plafond par défaut) ;
/// - étalement : `-day_spread × heures déjà posées ce jour-là` ;
/// - longueur : bonus bande préférée, sinon bonus réduit dès 2h ;
/// - continuité : bonus si la personne était déjà sur ce lieu ce jour-là.
pub fn score_assignment(
    state: &WorkerRunState,
    block_len: u8,
    day: WorkDay,
    location: &LocationId,
    config: &EngineConfig,
) -> f64 {
    let w = &config.weights;

    let cap = if state.max_hours == 0.0 {
        config.default_max_hours
    } else {
        state.max_hours
    };
    let mut score = -w.fairness * (state.assigned_hours / cap);

    score -= w.day_spread * f64::from(state.hours_on(day));

    if config.block.is_preferred(block_len) {
        score += w.preferred_block;
    } else if block_len >= 2 {
        score += w.acceptable_block;
    }

    if state.last_location_on(day) == Some(location) {
        score += w.continuity;
    }

    score
}
