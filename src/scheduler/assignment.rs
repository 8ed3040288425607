use super::availability::build_availability_map;
use super::blocks::find_best_block;
use super::scoring::score_assignment;
use super::state::WorkerRunState;
use super::types::{GenerateRequest, Generated, SchedError};
use super::{util, validate, Scheduler};
use crate::config::EngineConfig;
use crate::model::{
    HourRange, Location, ScheduleRun, ShiftBlock, ShiftId, ShiftStatus, Snapshot, Warning,
    WorkDay, Worker,
};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

pub(super) fn generate(
    scheduler: &Scheduler,
    snapshot: &Snapshot,
    request: GenerateRequest,
) -> Result<Generated, SchedError> {
    validate::validate_input(snapshot, request.week_start)?;
    let config = &scheduler.config;
    let monday = request.week_start;

    let mut locations: Vec<&Location> = snapshot.locations.iter().filter(|l| l.active).collect();
    locations.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

    // Ordre d'itération explicite : il départage les scores égaux.
    let mut workers: Vec<&Worker> = snapshot.workers.iter().filter(|w| w.active).collect();
    workers.sort_by(|a, b| a.id.cmp(&b.id));

    let mut availability = build_availability_map(
        workers.iter().map(|w| &w.id),
        &snapshot.availability,
        config.open_hour,
        config.close_hour,
    );
    let states = workers
        .iter()
        .map(|w| WorkerRunState::new(w, availability.remove(&w.id).unwrap_or_default()))
        .collect();

    let holidays = util::holiday_dates(&snapshot.holidays, monday);
    let time_off = util::time_off_dates(&snapshot.time_off, monday);

    let mut orchestrator = Orchestrator {
        config,
        states,
        schedule: ScheduleRun::draft(
            request.schedule_id,
            monday,
            request.generated_by,
            request.notes,
        ),
        warnings: Vec::new(),
    };

    for (day, date) in util::week_dates(monday) {
        if holidays.contains(&date) {
            debug!(%date, day = day.name(), "holiday, day skipped");
            continue;
        }
        let off: Vec<bool> = orchestrator
            .states
            .iter()
            .map(|s| time_off.get(&s.worker).is_some_and(|dates| dates.contains(&date)))
            .collect();
        for location in &locations {
            orchestrator.fill_location_day(day, date, location, &off);
        }
    }

    info!(
        schedule = %orchestrator.schedule.id,
        week = %monday,
        shifts = orchestrator.schedule.shifts.len(),
        warnings = orchestrator.warnings.len(),
        "schedule generated"
    );

    Ok(Generated {
        schedule: orchestrator.schedule,
        warnings: orchestrator.warnings,
    })
}

/// Propriétaire exclusif de l'état mutable d'un run.
struct Orchestrator<'a> {
    config: &'a EngineConfig,
    states: Vec<WorkerRunState>,
    schedule: ScheduleRun,
    warnings: Vec<Warning>,
}

struct Candidate {
    index: usize,
    block: HourRange,
    score: f64,
}

impl Orchestrator<'_> {
    /// Remplit au plus `max_staff` places ; s'arrête au premier créneau sans candidat.
    fn fill_location_day(&mut self, day: WorkDay, date: NaiveDate, location: &Location, off: &[bool]) {
        for slot in 0..location.max_staff {
            let Some(candidate) = self.best_candidate(day, location, off) else {
                if slot < location.min_staff {
                    self.record_shortfall(day, date, location, slot);
                }
                break;
            };
            self.commit(day, date, location, candidate);
        }
    }

    fn best_candidate(&self, day: WorkDay, location: &Location, off: &[bool]) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        for (index, state) in self.states.iter().enumerate() {
            if off[index] {
                continue;
            }
            let Some(hours) = state.available(day) else {
                continue;
            };
            let Some(block) = find_best_block(hours, state, &self.config.block) else {
                continue;
            };
            let score = score_assignment(state, block.len(), day, &location.id, self.config);
            // strictement supérieur : à égalité, le premier rencontré reste
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(Candidate { index, block, score });
            }
        }
        best
    }

    fn commit(&mut self, day: WorkDay, date: NaiveDate, location: &Location, candidate: Candidate) {
        let state = &mut self.states[candidate.index];
        state.commit(day, candidate.block, &location.id);

        let seq = self.schedule.shifts.len() + 1;
        let shift = ShiftBlock {
            id: ShiftId::new(format!("{}-{seq:03}", self.schedule.id)),
            schedule: self.schedule.id.clone(),
            worker: state.worker.clone(),
            location: location.id.clone(),
            day,
            hours: candidate.block,
            actual_date: date,
            status: ShiftStatus::Scheduled,
        };
        debug!(
            worker = %shift.worker,
            location = %location.name,
            %date,
            hours = %shift.hours,
            score = candidate.score,
            "shift assigned"
        );
        self.schedule.shifts.push(shift);
    }

    fn record_shortfall(&mut self, day: WorkDay, date: NaiveDate, location: &Location, filled: u32) {
        let message = format!(
            "Could not fill minimum staffing (need {}, filled {})",
            location.min_staff, filled
        );
        warn!(location = %location.name, %date, needed = location.min_staff, filled, "understaffed");
        self.warnings.push(Warning {
            day,
            date,
            time_slot: self.config.time_slot_label(),
            location_id: location.id.clone(),
            location: location.name.clone(),
            needed: location.min_staff,
            filled,
            message,
        });
    }
}
