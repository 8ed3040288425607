use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Location
    LocationId
);
string_id!(
    /// Identifiant fort pour Worker
    WorkerId
);
string_id!(
    /// Identifiant fort pour ScheduleRun
    ScheduleId
);
string_id!(
    /// Identifiant fort pour ShiftBlock
    ShiftId
);

/// Jour ouvré (lundi → vendredi). L'ordre de déclaration est l'ordre de la semaine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WorkDay {
    pub const ALL: [WorkDay; 5] = [
        WorkDay::Monday,
        WorkDay::Tuesday,
        WorkDay::Wednesday,
        WorkDay::Thursday,
        WorkDay::Friday,
    ];

    /// Décalage en jours depuis le lundi.
    pub fn offset(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            WorkDay::Monday => "Monday",
            WorkDay::Tuesday => "Tuesday",
            WorkDay::Wednesday => "Wednesday",
            WorkDay::Thursday => "Thursday",
            WorkDay::Friday => "Friday",
        }
    }
}

impl fmt::Display for WorkDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorkDay {
    type Err = String;

    /// Accepte le nom anglais complet ou son abréviation à trois lettres.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(WorkDay::Monday),
            "tuesday" | "tue" => Ok(WorkDay::Tuesday),
            "wednesday" | "wed" => Ok(WorkDay::Wednesday),
            "thursday" | "thu" => Ok(WorkDay::Thursday),
            "friday" | "fri" => Ok(WorkDay::Friday),
            other => Err(format!("unknown work day: {other}")),
        }
    }
}

/// Plage horaire semi-ouverte `[start, end)` en heures entières.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u8,
    pub end: u8,
}

impl HourRange {
    pub fn new(start: u8, end: u8) -> Result<Self, String> {
        if end <= start {
            return Err("hour range end must be after start".to_string());
        }
        if end > 24 {
            return Err("hour range cannot end after 24:00".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> u8 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn hours(&self) -> std::ops::Range<u8> {
        self.start..self.end
    }

    pub fn overlaps(&self, other: &HourRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Libellé `8:00-12:00`.
    pub fn label(&self) -> String {
        format!("{}:00-{}:00", self.start, self.end)
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start, self.end)
    }
}

fn default_true() -> bool {
    true
}

/// Lieu à staffer (guichet, bibliothèque…)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub min_staff: u32,
    pub max_staff: u32,
    /// Plus la valeur est haute, plus le lieu est servi tôt.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Location {
    pub fn new<N: Into<String>>(name: N, min_staff: u32, max_staff: u32, priority: i32) -> Self {
        Self {
            id: LocationId::random(),
            name: name.into(),
            min_staff,
            max_staff,
            priority,
            active: true,
        }
    }

    pub fn with_id(mut self, id: LocationId) -> Self {
        self.id = id;
        self
    }
}

/// Personne planifiable, avec son plafond hebdomadaire d'heures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub max_hours: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Worker {
    pub fn new<N: Into<String>>(name: N, max_hours: f64) -> Self {
        Self {
            id: WorkerId::random(),
            name: name.into(),
            max_hours,
            active: true,
        }
    }

    pub fn with_id(mut self, id: WorkerId) -> Self {
        self.id = id;
        self
    }
}

/// Disponibilité récurrente d'une personne, `[start_hour, end_hour)` chaque semaine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub worker: WorkerId,
    pub day: WorkDay,
    pub start_hour: u8,
    pub end_hour: u8,
}

impl AvailabilityWindow {
    pub fn new(worker: WorkerId, day: WorkDay, start_hour: u8, end_hour: u8) -> Result<Self, String> {
        HourRange::new(start_hour, end_hour)?;
        Ok(Self {
            worker,
            day,
            start_hour,
            end_hour,
        })
    }

    pub fn hours(&self) -> std::ops::Range<u8> {
        self.start_hour..self.end_hour
    }
}

/// Jours fériés / fermeture, bornes incluses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayInterval {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl HolidayInterval {
    pub fn new<N: Into<String>>(name: N, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, String> {
        if end_date < start_date {
            return Err("holiday end date must not precede start date".to_string());
        }
        Ok(Self {
            name: name.into(),
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffKind {
    TimeOff,
    SickDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffStatus {
    Pending,
    Approved,
    Denied,
}

impl fmt::Display for TimeOffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeOffStatus::Pending => "pending",
            TimeOffStatus::Approved => "approved",
            TimeOffStatus::Denied => "denied",
        })
    }
}

impl FromStr for TimeOffStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TimeOffStatus::Pending),
            "approved" | "approve" => Ok(TimeOffStatus::Approved),
            "denied" | "deny" => Ok(TimeOffStatus::Denied),
            other => Err(format!("unknown time-off status: {other}")),
        }
    }
}

/// Demande d'absence, bornes incluses. Seules les demandes `approved` bloquent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub worker: WorkerId,
    pub kind: TimeOffKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: TimeOffStatus,
}

impl TimeOffRequest {
    pub fn approved(worker: WorkerId, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, String> {
        if end_date < start_date {
            return Err("time-off end date must not precede start date".to_string());
        }
        Ok(Self {
            worker,
            kind: TimeOffKind::TimeOff,
            start_date,
            end_date,
            reason: None,
            status: TimeOffStatus::Approved,
        })
    }

    pub fn is_approved(&self) -> bool {
        self.status == TimeOffStatus::Approved
    }

    /// Décision sur une demande en attente ; une demande déjà traitée est refusée.
    pub fn review(&mut self, decision: TimeOffStatus) -> Result<(), String> {
        if self.status != TimeOffStatus::Pending {
            return Err(format!("time-off request already reviewed ({})", self.status));
        }
        if decision == TimeOffStatus::Pending {
            return Err("a review must approve or deny the request".to_string());
        }
        self.status = decision;
        Ok(())
    }
}

/// Photo des données d'entrée d'une génération (lecture seule pendant le run).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
    #[serde(default)]
    pub holidays: Vec<HolidayInterval>,
    #[serde(default)]
    pub time_off: Vec<TimeOffRequest>,
}

impl Snapshot {
    pub fn find_worker(&self, id: &WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| &w.id == id)
    }
    pub fn find_worker_by_name<'a>(&'a self, name: &str) -> Option<&'a Worker> {
        self.workers.iter().find(|w| w.name == name)
    }
    pub fn find_location(&self, id: &LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| &l.id == id)
    }
    pub fn worker_name(&self, id: &WorkerId) -> &str {
        self.find_worker(id).map_or("", |w| w.name.as_str())
    }
    pub fn location_name(&self, id: &LocationId) -> &str {
        self.find_location(id).map_or("", |l| l.name.as_str())
    }

    /// Retire un lieu des prochaines générations sans perdre son historique.
    pub fn deactivate_location(&mut self, id: &LocationId) -> Result<(), String> {
        let location = self
            .locations
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| format!("unknown location: {id}"))?;
        location.active = false;
        Ok(())
    }

    pub fn deactivate_worker(&mut self, id: &WorkerId) -> Result<(), String> {
        let worker = self
            .workers
            .iter_mut()
            .find(|w| &w.id == id)
            .ok_or_else(|| format!("unknown worker: {id}"))?;
        worker.active = false;
        Ok(())
    }

    /// Supprime les périodes fériées portant ce nom ; renvoie le nombre retiré.
    pub fn remove_holiday(&mut self, name: &str) -> usize {
        let before = self.holidays.len();
        self.holidays.retain(|h| h.name != name);
        before - self.holidays.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Draft,
    Published,
    Archived,
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScheduleStatus::Draft => "draft",
            ScheduleStatus::Published => "published",
            ScheduleStatus::Archived => "archived",
        })
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(ScheduleStatus::Draft),
            "published" => Ok(ScheduleStatus::Published),
            "archived" => Ok(ScheduleStatus::Archived),
            other => Err(format!("unknown schedule status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Scheduled,
    Completed,
    Missed,
    Swapped,
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShiftStatus::Scheduled => "scheduled",
            ShiftStatus::Completed => "completed",
            ShiftStatus::Missed => "missed",
            ShiftStatus::Swapped => "swapped",
        })
    }
}

impl FromStr for ShiftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(ShiftStatus::Scheduled),
            "completed" => Ok(ShiftStatus::Completed),
            "missed" => Ok(ShiftStatus::Missed),
            "swapped" => Ok(ShiftStatus::Swapped),
            other => Err(format!("unknown shift status: {other}")),
        }
    }
}

/// Bloc de travail : une personne, un lieu, un jour, une plage horaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftBlock {
    pub id: ShiftId,
    pub schedule: ScheduleId,
    pub worker: WorkerId,
    pub location: LocationId,
    pub day: WorkDay,
    pub hours: HourRange,
    pub actual_date: NaiveDate,
    pub status: ShiftStatus,
}

impl ShiftBlock {
    pub fn duration_hours(&self) -> u32 {
        u32::from(self.hours.len())
    }
}

/// Planning d'une semaine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRun {
    pub id: ScheduleId,
    pub week_start: NaiveDate,
    pub status: ScheduleStatus,
    pub generated_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub shifts: Vec<ShiftBlock>,
}

impl ScheduleRun {
    pub fn draft<G: Into<String>>(
        id: ScheduleId,
        week_start: NaiveDate,
        generated_by: G,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            week_start,
            status: ScheduleStatus::Draft,
            generated_by: generated_by.into(),
            notes,
            shifts: Vec::new(),
        }
    }

    pub fn shifts_for<'a>(&'a self, worker: &'a WorkerId) -> impl Iterator<Item = &'a ShiftBlock> + 'a {
        self.shifts.iter().filter(move |s| &s.worker == worker)
    }

    pub fn hours_for(&self, worker: &WorkerId) -> u32 {
        self.shifts_for(worker).map(ShiftBlock::duration_hours).sum()
    }

    /// Blocs triés par (date, heure de début, lieu).
    pub fn sorted_shifts(&self) -> Vec<&ShiftBlock> {
        let mut shifts: Vec<&ShiftBlock> = self.shifts.iter().collect();
        shifts.sort_by(|a, b| {
            (a.actual_date, a.hours.start, &a.location).cmp(&(b.actual_date, b.hours.start, &b.location))
        });
        shifts
    }
}

/// Alerte de sous-effectif pour un (jour, lieu).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub day: WorkDay,
    pub date: NaiveDate,
    pub time_slot: String,
    pub location_id: LocationId,
    pub location: String,
    pub needed: u32,
    pub filled: u32,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn pending_time_off_is_reviewed_once() {
        let mut req = TimeOffRequest::approved(WorkerId::new("alex"), date(4), date(5)).unwrap();
        req.status = TimeOffStatus::Pending;

        assert!(req.review(TimeOffStatus::Pending).is_err());
        req.review(TimeOffStatus::Approved).unwrap();
        assert!(req.is_approved());

        let err = req.review(TimeOffStatus::Denied).unwrap_err();
        assert!(err.contains("already reviewed"));
        assert_eq!(req.status, TimeOffStatus::Approved);
    }

    #[test]
    fn statuses_parse_from_cli_words() {
        assert_eq!("approve".parse::<TimeOffStatus>(), Ok(TimeOffStatus::Approved));
        assert_eq!("Denied".parse::<TimeOffStatus>(), Ok(TimeOffStatus::Denied));
        assert_eq!("missed".parse::<ShiftStatus>(), Ok(ShiftStatus::Missed));
        assert!("late".parse::<ShiftStatus>().is_err());
        assert_eq!(ShiftStatus::Swapped.to_string(), "swapped");
    }

    #[test]
    fn snapshot_records_can_be_retired() {
        let mut snapshot = Snapshot {
            locations: vec![Location::new("Library", 1, 2, 0).with_id(LocationId::new("library"))],
            workers: vec![Worker::new("Alex", 20.0).with_id(WorkerId::new("alex"))],
            holidays: vec![
                HolidayInterval::new("Closure", date(6), date(6)).unwrap(),
                HolidayInterval::new("Closure", date(7), date(7)).unwrap(),
                HolidayInterval::new("Summer", date(14), date(14)).unwrap(),
            ],
            ..Snapshot::default()
        };

        snapshot.deactivate_location(&LocationId::new("library")).unwrap();
        snapshot.deactivate_worker(&WorkerId::new("alex")).unwrap();
        assert!(!snapshot.locations[0].active);
        assert!(!snapshot.workers[0].active);
        assert!(snapshot.deactivate_worker(&WorkerId::new("ghost")).is_err());

        assert_eq!(snapshot.remove_holiday("Closure"), 2);
        assert_eq!(snapshot.remove_holiday("Closure"), 0);
        assert_eq!(snapshot.holidays.len(), 1);
    }
}
