use super::types::{Violation, ViolationKind};
use super::util;
use crate::model::{ScheduleRun, ShiftBlock, Snapshot};

/// Revérifie un planning contre les invariants (chevauchement, plafond,
/// fériés, absences, disponibilités déclarées).
pub(super) fn audit(run: &ScheduleRun, snapshot: &Snapshot) -> Vec<Violation> {
    let mut out = Vec::new();
    let holidays = util::holiday_dates(&snapshot.holidays, run.week_start);
    let time_off = util::time_off_dates(&snapshot.time_off, run.week_start);

    for worker in snapshot.workers.iter() {
        let mut shifts: Vec<&ShiftBlock> = run.shifts_for(&worker.id).collect();
        shifts.sort_by_key(|s| (s.actual_date, s.hours.start));

        for (idx, a) in shifts.iter().enumerate() {
            for b in shifts.iter().skip(idx + 1) {
                if a.actual_date == b.actual_date && a.hours.overlaps(&b.hours) {
                    out.push(violation(a, Some(b), ViolationKind::Overlap));
                }
            }

            if holidays.contains(&a.actual_date) {
                out.push(violation(a, None, ViolationKind::HolidayAssignment));
            }
            if time_off
                .get(&worker.id)
                .is_some_and(|dates| dates.contains(&a.actual_date))
            {
                out.push(violation(a, None, ViolationKind::TimeOffAssignment));
            }

            let covered = a.hours.hours().all(|hour| {
                snapshot.availability.iter().any(|w| {
                    w.worker == worker.id && w.day == a.day && w.hours().contains(&hour)
                })
            });
            if !covered {
                out.push(violation(a, None, ViolationKind::OutsideAvailability));
            }
        }

        let total = f64::from(run.hours_for(&worker.id));
        if total > worker.max_hours {
            if let Some(last) = shifts.last() {
                out.push(violation(last, None, ViolationKind::HourCapExceeded));
            }
        }
    }

    out
}

fn violation(a: &ShiftBlock, b: Option<&&ShiftBlock>, kind: ViolationKind) -> Violation {
    Violation {
        worker: a.worker.clone(),
        shift_a: a.id.clone(),
        shift_b: b.map(|s| s.id.clone()),
        kind,
    }
}
