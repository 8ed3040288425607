use crate::model::{
    AvailabilityWindow, Location, LocationId, ScheduleRun, Snapshot, Warning, WorkDay, Worker,
    WorkerId,
};
use crate::scheduler::merge_runs;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

/// Colonne `<Day>_<H>:00` de la matrice de disponibilités.
fn parse_slot_column(header: &str) -> anyhow::Result<(WorkDay, u8)> {
    let (day, time) = header
        .split_once('_')
        .with_context(|| format!("unexpected column {header:?}"))?;
    let day: WorkDay = day.parse().map_err(anyhow::Error::msg)?;
    let hour = time
        .trim()
        .strip_suffix(":00")
        .with_context(|| format!("column {header:?}: expected whole hour like 8:00"))?;
    let hour: u8 = hour
        .parse()
        .with_context(|| format!("column {header:?}: invalid hour"))?;
    if hour >= 24 {
        bail!("column {header:?}: hour out of range");
    }
    Ok((day, hour))
}

/// Identifiant dérivé du nom : minuscules, séparateurs `-`.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Lecture de la matrice de disponibilités: header `Name,Max_Hours,<Day>_<H>:00,...`,
/// une cellule `1` = disponible. Les heures consécutives d'un même jour sont
/// regroupées en fenêtres.
pub fn read_availability_csv<R: std::io::Read>(
    reader: R,
) -> anyhow::Result<(Vec<Worker>, Vec<AvailabilityWindow>)> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let name_col = headers
        .iter()
        .position(|h| h.trim() == "Name")
        .context("missing Name column")?;
    let max_col = headers
        .iter()
        .position(|h| h.trim() == "Max_Hours")
        .context("missing Max_Hours column")?;
    let slots: Vec<(usize, WorkDay, u8)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != name_col && *idx != max_col)
        .map(|(idx, h)| parse_slot_column(h).map(|(day, hour)| (idx, day, hour)))
        .collect::<anyhow::Result<_>>()?;

    let mut workers = Vec::new();
    let mut windows = Vec::new();
    let mut seen = HashSet::new();

    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let row = line + 2;
        let name = rec.get(name_col).context("missing Name")?.trim();
        if name.is_empty() {
            bail!("row {row}: empty Name");
        }
        let max_hours: f64 = rec
            .get(max_col)
            .context("missing Max_Hours")?
            .trim()
            .parse()
            .with_context(|| format!("row {row}: invalid Max_Hours for {name}"))?;
        if !max_hours.is_finite() || max_hours < 0.0 {
            bail!("row {row}: Max_Hours must be a non-negative number");
        }

        let id = WorkerId::new(slug(name));
        if !seen.insert(id.clone()) {
            bail!("row {row}: duplicate worker {name}");
        }

        let mut days: BTreeMap<WorkDay, BTreeSet<u8>> = BTreeMap::new();
        for (idx, day, hour) in &slots {
            if rec.get(*idx).map(str::trim) == Some("1") {
                days.entry(*day).or_default().insert(*hour);
            }
        }
        for (day, hours) in &days {
            for run in merge_runs(hours) {
                windows.push(
                    AvailabilityWindow::new(id.clone(), *day, run.start, run.end)
                        .map_err(anyhow::Error::msg)?,
                );
            }
        }

        workers.push(Worker::new(name, max_hours).with_id(id));
    }

    Ok((workers, windows))
}

pub fn import_availability_csv<P: AsRef<Path>>(
    path: P,
) -> anyhow::Result<(Vec<Worker>, Vec<AvailabilityWindow>)> {
    let path = path.as_ref();
    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_availability_csv(file)
}

/// Import de lieux depuis CSV: header `name,min_staff,max_staff[,priority]`
pub fn import_locations_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Location>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid location row (empty name)");
        }
        let min: u32 = rec
            .get(1)
            .context("missing min_staff")?
            .trim()
            .parse()
            .with_context(|| format!("invalid min_staff for {name}"))?;
        let max: u32 = rec
            .get(2)
            .context("missing max_staff")?
            .trim()
            .parse()
            .with_context(|| format!("invalid max_staff for {name}"))?;
        let priority: i32 = match rec.get(3).map(str::trim) {
            Some(p) if !p.is_empty() => p
                .parse()
                .with_context(|| format!("invalid priority for {name}"))?,
            _ => 0,
        };
        if min > max {
            bail!("location {name}: min_staff exceeds max_staff");
        }
        let id = slug(name);
        if id.is_empty() {
            bail!("location {name:?}: name needs at least one letter or digit");
        }
        out.push(Location::new(name, min, max, priority).with_id(LocationId::new(id)));
    }
    Ok(out)
}

/// Export CSV d'un planning: header `Day,Date,Start,End,Location,Worker`, trié par (date, début).
pub fn write_schedule_csv<W: std::io::Write>(
    writer: W,
    run: &ScheduleRun,
    snapshot: &Snapshot,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record(["Day", "Date", "Start", "End", "Location", "Worker"])?;
    for s in run.sorted_shifts() {
        let date = s.actual_date.to_string();
        let start = format!("{:02}:00", s.hours.start);
        let end = format!("{:02}:00", s.hours.end);
        w.write_record([
            s.day.name(),
            date.as_str(),
            start.as_str(),
            end.as_str(),
            snapshot.location_name(&s.location),
            snapshot.worker_name(&s.worker),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_schedule_csv<P: AsRef<Path>>(
    path: P,
    run: &ScheduleRun,
    snapshot: &Snapshot,
) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_schedule_csv(file, run, snapshot)
}

/// Export CSV des alertes: header `Day,Date,Time Slot,Location,Message`
pub fn export_warnings_csv<P: AsRef<Path>>(path: P, warnings: &[Warning]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["Day", "Date", "Time Slot", "Location", "Message"])?;
    for warning in warnings {
        let date = warning.date.to_string();
        w.write_record([
            warning.day.name(),
            date.as_str(),
            warning.time_slot.as_str(),
            warning.location.as_str(),
            warning.message.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct ScheduleExport<'a> {
    schedule: &'a ScheduleRun,
    warnings: &'a [Warning],
}

/// Export JSON du planning et de ses alertes (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(
    path: P,
    run: &ScheduleRun,
    warnings: &[Warning],
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(&ScheduleExport {
        schedule: run,
        warnings,
    })?;
    fs::write(path, s)?;
    Ok(())
}
