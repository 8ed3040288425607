use crate::model::{HolidayInterval, HourRange, TimeOffRequest, WorkDay, WorkerId};
use chrono::{Days, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Regroupe des heures en plages contiguës maximales, dans l'ordre croissant.
/// Seules les heures d'une journée (`0..24`) comptent ; les autres sont ignorées.
pub fn merge_runs(hours: &BTreeSet<u8>) -> Vec<HourRange> {
    let mut runs = Vec::new();
    let mut iter = hours.range(..24).copied();
    let Some(first) = iter.next() else {
        return runs;
    };

    let mut start = first;
    let mut prev = first;
    for hour in iter {
        if hour == prev + 1 {
            prev = hour;
            continue;
        }
        runs.push(HourRange { start, end: prev + 1 });
        start = hour;
        prev = hour;
    }
    runs.push(HourRange { start, end: prev + 1 });
    runs
}

/// Les cinq jours ouvrés d'une semaine et leur date.
pub fn week_dates(monday: NaiveDate) -> [(WorkDay, NaiveDate); 5] {
    WorkDay::ALL.map(|day| (day, monday + Days::new(u64::from(day.offset()))))
}

/// Dates d'un intervalle inclus, restreintes au lundi..=vendredi de la semaine.
pub fn dates_within_week(start: NaiveDate, end: NaiveDate, monday: NaiveDate) -> Vec<NaiveDate> {
    let friday = monday + Days::new(4);
    let first = start.max(monday);
    let last = end.min(friday);
    first.iter_days().take_while(|d| *d <= last).collect()
}

pub fn holiday_dates(holidays: &[HolidayInterval], monday: NaiveDate) -> BTreeSet<NaiveDate> {
    holidays
        .iter()
        .flat_map(|h| dates_within_week(h.start_date, h.end_date, monday))
        .collect()
}

/// Dates d'absence approuvées, par personne.
pub fn time_off_dates(
    requests: &[TimeOffRequest],
    monday: NaiveDate,
) -> BTreeMap<WorkerId, BTreeSet<NaiveDate>> {
    let mut out: BTreeMap<WorkerId, BTreeSet<NaiveDate>> = BTreeMap::new();
    for req in requests.iter().filter(|r| r.is_approved()) {
        out.entry(req.worker.clone())
            .or_default()
            .extend(dates_within_week(req.start_date, req.end_date, monday));
    }
    out
}
