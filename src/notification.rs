use crate::model::{ScheduleRun, ShiftBlock, Snapshot, Worker, WorkerId};
use std::fmt::Write as _;

/// Récapitulatif des blocs d'une personne pour un planning.
#[derive(Debug, Clone)]
pub struct Digest {
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub shift_count: usize,
    pub hours: u32,
    pub content: String,
}

/// Ligne de récapitulatif : un bloc et le nom de son lieu.
#[derive(Debug, Clone)]
pub struct DigestEntry<'a> {
    pub shift: &'a ShiftBlock,
    pub location_name: &'a str,
}

/// Permet de customiser le rendu du message (texte, mail, etc.).
pub trait ShiftDigestRenderer {
    fn render(&self, worker: &Worker, entries: &[DigestEntry<'_>], run: &ScheduleRun) -> String;
}

/// Gabarit texte simple.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextDigest;

impl ShiftDigestRenderer for TextDigest {
    fn render(&self, worker: &Worker, entries: &[DigestEntry<'_>], run: &ScheduleRun) -> String {
        let hours: u32 = entries.iter().map(|e| e.shift.duration_hours()).sum();
        let mut out = format!(
            "Hi {name},\n\nHere are your shifts for the week of {week} ({hours}h):\n\n",
            name = worker.name,
            week = run.week_start,
        );
        for entry in entries {
            let s = entry.shift;
            let _ = writeln!(
                out,
                "- {day} {date}  {range}  @ {location}",
                day = s.day,
                date = s.actual_date,
                range = s.hours,
                location = entry.location_name,
            );
        }
        out.push_str("\nContact your supervisor if anything no longer fits.\n");
        out
    }
}

/// Un récapitulatif par personne ayant au moins un bloc, triés par identifiant.
pub fn prepare_digests(
    run: &ScheduleRun,
    snapshot: &Snapshot,
    renderer: &dyn ShiftDigestRenderer,
) -> Vec<Digest> {
    let mut workers: Vec<&Worker> = snapshot.workers.iter().collect();
    workers.sort_by(|a, b| a.id.cmp(&b.id));

    workers
        .into_iter()
        .filter_map(|worker| {
            let entries: Vec<DigestEntry<'_>> = run
                .sorted_shifts()
                .into_iter()
                .filter(|s| s.worker == worker.id)
                .map(|shift| DigestEntry {
                    shift,
                    location_name: snapshot.location_name(&shift.location),
                })
                .collect();
            if entries.is_empty() {
                return None;
            }
            Some(Digest {
                worker_id: worker.id.clone(),
                worker_name: worker.name.clone(),
                shift_count: entries.len(),
                hours: entries.iter().map(|e| e.shift.duration_hours()).sum(),
                content: renderer.render(worker, &entries, run),
            })
        })
        .collect()
}
