use super::availability::DayHours;
use crate::model::{HourRange, LocationId, WorkDay, Worker, WorkerId};
use std::collections::{BTreeMap, BTreeSet};

/// État transitoire d'une personne pendant un run. Seul l'orchestrateur le mute,
/// après chaque affectation validée.
#[derive(Debug, Clone)]
pub struct WorkerRunState {
    pub worker: WorkerId,
    pub max_hours: f64,
    pub assigned_hours: f64,
    pub day_hours: BTreeMap<WorkDay, u32>,
    pub last_location: BTreeMap<WorkDay, LocationId>,
    available: DayHours,
}

impl WorkerRunState {
    pub fn new(worker: &Worker, available: DayHours) -> Self {
        Self {
            worker: worker.id.clone(),
            max_hours: worker.max_hours,
            assigned_hours: 0.0,
            day_hours: BTreeMap::new(),
            last_location: BTreeMap::new(),
            available,
        }
    }

    pub fn available(&self, day: WorkDay) -> Option<&BTreeSet<u8>> {
        self.available.get(&day).filter(|hours| !hours.is_empty())
    }

    pub fn remaining_hours(&self) -> f64 {
        (self.max_hours - self.assigned_hours).max(0.0)
    }

    pub fn hours_on(&self, day: WorkDay) -> u32 {
        self.day_hours.get(&day).copied().unwrap_or(0)
    }

    pub fn last_location_on(&self, day: WorkDay) -> Option<&LocationId> {
        self.last_location.get(&day)
    }

    /// Enregistre un bloc : cumul, heures du jour, dernier lieu, et consomme les
    /// heures du bloc pour qu'elles ne soient plus réattribuables.
    pub fn commit(&mut self, day: WorkDay, block: HourRange, location: &LocationId) {
        let len = u32::from(block.len());
        self.assigned_hours += f64::from(len);
        *self.day_hours.entry(day).or_default() += len;
        self.last_location.insert(day, location.clone());
        if let Some(hours) = self.available.get_mut(&day) {
            for hour in block.hours() {
                hours.remove(&hour);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_consumes_hours_and_accumulates() {
        let worker = Worker::new("Alex", 10.0).with_id(WorkerId::new("alex"));
        let mut days = DayHours::new();
        days.insert(WorkDay::Monday, (8..14).collect());
        let mut state = WorkerRunState::new(&worker, days);
        let desk = LocationId::new("desk");

        state.commit(WorkDay::Monday, HourRange::new(8, 12).unwrap(), &desk);

        assert_eq!(state.assigned_hours, 4.0);
        assert_eq!(state.hours_on(WorkDay::Monday), 4);
        assert_eq!(state.last_location_on(WorkDay::Monday), Some(&desk));
        let left: Vec<u8> = state.available(WorkDay::Monday).unwrap().iter().copied().collect();
        assert_eq!(left, vec![12, 13]);
        assert_eq!(state.remaining_hours(), 6.0);

        state.commit(WorkDay::Monday, HourRange::new(12, 14).unwrap(), &desk);
        assert!(state.available(WorkDay::Monday).is_none());
    }
}
