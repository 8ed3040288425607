use crate::model::{ScheduleRun, Snapshot};
use anyhow::Result;
use std::fs;
use std::path::Path;

const PRODID: &str = "-//deskrota//Shift Schedule//EN";

/// Échappement TEXT (RFC 5545 §3.3.11).
fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Repli d'une ligne de contenu à 75 octets (RFC 5545 §3.1) : CRLF puis une
/// espace en tête de chaque ligne de continuation. Ne coupe jamais un caractère UTF-8.
fn fold_line(line: &str) -> String {
    const LIMIT: usize = 75;
    if line.len() <= LIMIT {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / 64 * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > LIMIT {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}

/// Rend le planning en VCALENDAR, un VEVENT par bloc. Heures des blocs flottantes
/// (locales), `DTSTAMP` en UTC.
pub fn schedule_to_ics(run: &ScheduleRun, snapshot: &Snapshot, calendar_name: &str) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        format!("PRODID:{PRODID}"),
        "VERSION:2.0".to_string(),
        format!("X-WR-CALNAME:{}", escape_text(calendar_name)),
    ];

    let stamp = run.week_start.format("%Y%m%dT000000Z");
    for shift in run.sorted_shifts() {
        let location = match snapshot.location_name(&shift.location) {
            "" => "Unknown",
            name => name,
        };
        let worker = match snapshot.worker_name(&shift.worker) {
            "" => "Unassigned",
            name => name,
        };
        let date = shift.actual_date.format("%Y%m%d");

        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}@deskrota", shift.id));
        lines.push(format!("DTSTAMP:{stamp}"));
        lines.push(format!("SUMMARY:{}", escape_text(&format!("Help Desk: {location}"))));
        lines.push(format!(
            "DESCRIPTION:{}",
            escape_text(&format!("Worker: {worker}\nLocation: {location}"))
        ));
        lines.push(format!("DTSTART:{date}T{:02}0000", shift.hours.start));
        lines.push(format!("DTEND:{date}T{:02}0000", shift.hours.end));
        lines.push(format!("LOCATION:{}", escape_text(location)));
        lines.push("END:VEVENT".to_string());
    }
    lines.push("END:VCALENDAR".to_string());

    let mut out = lines
        .iter()
        .map(|line| fold_line(line))
        .collect::<Vec<_>>()
        .join("\r\n");
    out.push_str("\r\n");
    out
}

pub fn export_schedule_ics<P: AsRef<Path>>(
    path: P,
    run: &ScheduleRun,
    snapshot: &Snapshot,
    calendar_name: &str,
) -> Result<()> {
    fs::write(path, schedule_to_ics(run, snapshot, calendar_name))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{escape_text, fold_line};

    #[test]
    fn text_values_are_escaped() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }

    #[test]
    fn long_lines_fold_at_75_octets() {
        let short = "SUMMARY:Help Desk";
        assert_eq!(fold_line(short), short);

        let line = format!("LOCATION:{}", "x".repeat(150));
        let folded = fold_line(&line);
        let parts: Vec<&str> = folded.split("\r\n").collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.len() <= 75));
        assert!(parts[1..].iter().all(|p| p.starts_with(' ')));
        let unfolded: String = folded.replace("\r\n ", "");
        assert_eq!(unfolded, line);
    }

    #[test]
    fn folding_keeps_multibyte_characters_whole() {
        let line = format!("LOCATION:{}", "é".repeat(60));
        let folded = fold_line(&line);
        for part in folded.split("\r\n") {
            assert!(part.len() <= 75);
        }
        assert_eq!(folded.replace("\r\n ", ""), line);
    }
}
