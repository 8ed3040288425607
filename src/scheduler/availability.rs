use crate::model::{AvailabilityWindow, WorkDay, WorkerId};
use std::collections::{BTreeMap, BTreeSet};

/// Heures disponibles par jour pour une personne.
pub type DayHours = BTreeMap<WorkDay, BTreeSet<u8>>;

/// Personne → jour → heures disponibles.
pub type AvailabilityMap = BTreeMap<WorkerId, DayHours>;

/// Aplati les fenêtres récurrentes en ensembles d'heures entières, bornés à
/// `[open_hour, close_hour)`. Les fenêtres qui se chevauchent fusionnent ; les
/// fenêtres d'identifiants inconnus sont ignorées.
pub fn build_availability_map<'a, I>(
    workers: I,
    windows: &[AvailabilityWindow],
    open_hour: u8,
    close_hour: u8,
) -> AvailabilityMap
where
    I: IntoIterator<Item = &'a WorkerId>,
{
    let mut map: AvailabilityMap = workers
        .into_iter()
        .map(|id| (id.clone(), DayHours::new()))
        .collect();

    for window in windows {
        let Some(days) = map.get_mut(&window.worker) else {
            continue;
        };
        let hours = days.entry(window.day).or_default();
        hours.extend(window.hours().filter(|h| (open_hour..close_hour).contains(h)));
    }

    map
}
