use crate::model::{LocationId, ScheduleId, ScheduleRun, ShiftId, Warning, WorkerId};
use chrono::NaiveDate;
use thiserror::Error;

/// Paramètres d'une génération hebdomadaire.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Lundi de la semaine visée.
    pub week_start: NaiveDate,
    pub schedule_id: ScheduleId,
    pub generated_by: String,
    pub notes: Option<String>,
}

impl GenerateRequest {
    pub fn new<G: Into<String>>(week_start: NaiveDate, generated_by: G) -> Self {
        Self {
            week_start,
            schedule_id: ScheduleId::random(),
            generated_by: generated_by.into(),
            notes: None,
        }
    }

    pub fn with_schedule_id(mut self, id: ScheduleId) -> Self {
        self.schedule_id = id;
        self
    }

    pub fn with_notes<N: Into<String>>(mut self, notes: N) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Résultat d'un run : planning en brouillon + alertes dans l'ordre d'émission.
#[derive(Debug, Clone)]
pub struct Generated {
    pub schedule: ScheduleRun,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Overlap,
    HourCapExceeded,
    HolidayAssignment,
    TimeOffAssignment,
    OutsideAvailability,
}

impl ViolationKind {
    pub fn label(self) -> &'static str {
        match self {
            ViolationKind::Overlap => "overlap",
            ViolationKind::HourCapExceeded => "hour_cap",
            ViolationKind::HolidayAssignment => "holiday",
            ViolationKind::TimeOffAssignment => "time_off",
            ViolationKind::OutsideAvailability => "availability",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub worker: WorkerId,
    pub shift_a: ShiftId,
    pub shift_b: Option<ShiftId>,
    pub kind: ViolationKind,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("week start {0} is not a Monday")]
    NotMonday(NaiveDate),
    #[error("invalid location {id}: {reason}")]
    InvalidLocation { id: LocationId, reason: &'static str },
    #[error("invalid worker {id}: {reason}")]
    InvalidWorker { id: WorkerId, reason: &'static str },
    #[error("invalid availability window for worker {0}: end must be after start and within 24h")]
    InvalidWindow(WorkerId),
    #[error("invalid date range for {0}: end date precedes start date")]
    InvalidDateRange(String),
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
