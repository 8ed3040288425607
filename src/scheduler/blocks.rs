use super::state::WorkerRunState;
use super::util::merge_runs;
use crate::config::BlockPolicy;
use crate::model::HourRange;
use std::collections::BTreeSet;

/// Niveau de préférence d'un bloc candidat (du moins au plus désirable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Single,
    Acceptable,
    Preferred,
}

fn tier(len: u8, policy: &BlockPolicy) -> Tier {
    if policy.is_preferred(len) {
        Tier::Preferred
    } else if len >= 2 {
        Tier::Acceptable
    } else {
        Tier::Single
    }
}

/// Tronque une plage trop longue depuis son début. Une plage au-delà du maximum
/// retombe sur la borne haute de la bande préférée.
fn clamp_run(run: HourRange, policy: &BlockPolicy) -> HourRange {
    if run.len() > policy.max_hours {
        HourRange {
            start: run.start,
            end: run.start + policy.preferred_max,
        }
    } else {
        run
    }
}

/// Meilleur bloc contigu parmi les heures restantes d'une personne sur un jour.
///
/// Une plage de plus de `max_hours` heures est ramenée à `preferred_max` heures
/// et non à `max_hours` ; une plage d'exactement `max_hours` heures reste entière
/// (hors bande préférée, donc moins bien classée qu'une plage de 3 à 4 heures).
///
/// À niveau égal, la première plage dans l'ordre croissant des heures gagne.
/// Le bloc est ensuite raccourci au budget hebdomadaire restant (arrondi à
/// l'heure inférieure) ; moins d'une heure ⇒ aucun bloc.
pub fn find_best_block(
    hours: &BTreeSet<u8>,
    state: &WorkerRunState,
    policy: &BlockPolicy,
) -> Option<HourRange> {
    let mut best: Option<(Tier, HourRange)> = None;
    for run in merge_runs(hours) {
        let block = clamp_run(run, policy);
        let t = tier(block.len(), policy);
        if best.map_or(true, |(best_tier, _)| t > best_tier) {
            best = Some((t, block));
        }
    }

    let (_, block) = best?;
    let budget = state.remaining_hours().floor();
    if f64::from(block.len()) <= budget {
        return Some(block);
    }
    if budget < 1.0 {
        return None;
    }
    // budget < block.len() <= 24 ici, la conversion est sûre
    Some(HourRange {
        start: block.start,
        end: block.start + budget as u8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Worker;
    use crate::scheduler::availability::DayHours;

    fn state_with(max_hours: f64, assigned: f64) -> WorkerRunState {
        let mut state = WorkerRunState::new(&Worker::new("w", max_hours), DayHours::new());
        state.assigned_hours = assigned;
        state
    }

    fn hours(list: &[u8]) -> BTreeSet<u8> {
        list.iter().copied().collect()
    }

    fn policy() -> BlockPolicy {
        BlockPolicy::default()
    }

    #[test]
    fn prefers_three_to_four_hour_runs() {
        let state = state_with(20.0, 0.0);
        // 8-10 (2h), 11-14 (3h), 15-17 (2h)
        let block = find_best_block(&hours(&[8, 9, 11, 12, 13, 15, 16]), &state, &policy());
        assert_eq!(block, Some(HourRange { start: 11, end: 14 }));
    }

    #[test]
    fn first_run_wins_within_a_tier() {
        let state = state_with(20.0, 0.0);
        let block = find_best_block(&hours(&[8, 9, 10, 12, 13, 14, 15]), &state, &policy());
        assert_eq!(block, Some(HourRange { start: 8, end: 11 }));

        let block = find_best_block(&hours(&[8, 9, 11, 12]), &state, &policy());
        assert_eq!(block, Some(HourRange { start: 8, end: 10 }));
    }

    #[test]
    fn single_hours_only_when_nothing_longer() {
        let state = state_with(20.0, 0.0);
        let block = find_best_block(&hours(&[8, 10, 11]), &state, &policy());
        assert_eq!(block, Some(HourRange { start: 10, end: 12 }));

        let block = find_best_block(&hours(&[8, 10]), &state, &policy());
        assert_eq!(block, Some(HourRange { start: 8, end: 9 }));
    }

    #[test]
    fn five_hour_runs_are_kept_whole_but_longer_runs_are_cut() {
        let state = state_with(20.0, 0.0);
        let block = find_best_block(&hours(&[8, 9, 10, 11, 12]), &state, &policy());
        assert_eq!(block, Some(HourRange { start: 8, end: 13 }));

        let block = find_best_block(&hours(&[8, 9, 10, 11, 12, 13]), &state, &policy());
        assert_eq!(block, Some(HourRange { start: 8, end: 12 }));
    }

    #[test]
    fn block_is_trimmed_to_remaining_budget() {
        let state = state_with(10.0, 7.5);
        let block = find_best_block(&hours(&[8, 9, 10, 11]), &state, &policy());
        assert_eq!(block, Some(HourRange { start: 8, end: 10 }));

        let exhausted = state_with(10.0, 9.5);
        assert_eq!(find_best_block(&hours(&[8, 9, 10, 11]), &exhausted, &policy()), None);
    }

    #[test]
    fn empty_hours_yield_nothing() {
        let state = state_with(20.0, 0.0);
        assert_eq!(find_best_block(&BTreeSet::new(), &state, &policy()), None);
    }
}
