#![forbid(unsafe_code)]
//! Deskrota : génération hebdomadaire de plannings multi-sites (sans BD).
//!
//! - Moteur glouton à score : équité, étalement, longueur de bloc, continuité.
//! - Lieux servis par priorité décroissante ; alertes de sous-effectif.
//! - Fériés et absences approuvées respectés.
//! - Stockage fichiers (JSON/CSV), export ICS.

pub mod calendar;
pub mod config;
pub mod io;
pub mod lifecycle;
pub mod model;
pub mod notification;
pub mod scheduler;
pub mod storage;

pub use calendar::{export_schedule_ics, schedule_to_ics};
pub use config::{load_config_from_file, BlockPolicy, EngineConfig, ScoreWeights};
pub use lifecycle::{LifecycleError, ScheduleBook};
pub use model::{
    AvailabilityWindow, HolidayInterval, HourRange, Location, LocationId, ScheduleId, ScheduleRun,
    ScheduleStatus, ShiftBlock, ShiftId, ShiftStatus, Snapshot, TimeOffKind, TimeOffRequest,
    TimeOffStatus, Warning, WorkDay, Worker, WorkerId,
};
pub use notification::{prepare_digests, Digest, ShiftDigestRenderer, TextDigest};
pub use scheduler::{generate_week, GenerateRequest, Generated, SchedError, Scheduler, Violation, ViolationKind};
pub use storage::{JsonStorage, Storage, Workspace};
