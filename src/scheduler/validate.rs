use super::types::SchedError;
use crate::model::{HourRange, Snapshot};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

/// Rejette les entrées mal formées avant tout run ; rien n'est corrigé en silence.
pub(super) fn validate_input(snapshot: &Snapshot, week_start: NaiveDate) -> Result<(), SchedError> {
    if week_start.weekday() != Weekday::Mon {
        return Err(SchedError::NotMonday(week_start));
    }

    let mut seen = HashSet::new();
    for location in &snapshot.locations {
        if !seen.insert(location.id.as_str()) {
            return Err(SchedError::DuplicateId(location.id.to_string()));
        }
        if location.name.trim().is_empty() {
            return Err(SchedError::InvalidLocation {
                id: location.id.clone(),
                reason: "name cannot be empty",
            });
        }
        if location.min_staff > location.max_staff {
            return Err(SchedError::InvalidLocation {
                id: location.id.clone(),
                reason: "min_staff exceeds max_staff",
            });
        }
    }

    let mut seen = HashSet::new();
    for worker in &snapshot.workers {
        if !seen.insert(worker.id.as_str()) {
            return Err(SchedError::DuplicateId(worker.id.to_string()));
        }
        if !worker.max_hours.is_finite() || worker.max_hours < 0.0 {
            return Err(SchedError::InvalidWorker {
                id: worker.id.clone(),
                reason: "max_hours must be a non-negative number",
            });
        }
    }

    if let Some(window) = snapshot
        .availability
        .iter()
        .find(|w| HourRange::new(w.start_hour, w.end_hour).is_err())
    {
        return Err(SchedError::InvalidWindow(window.worker.clone()));
    }

    if let Some(holiday) = snapshot.holidays.iter().find(|h| h.end_date < h.start_date) {
        return Err(SchedError::InvalidDateRange(format!("holiday {}", holiday.name)));
    }
    if let Some(req) = snapshot.time_off.iter().find(|r| r.end_date < r.start_date) {
        return Err(SchedError::InvalidDateRange(format!("time-off of {}", req.worker)));
    }

    Ok(())
}
