mod assignment;
mod availability;
mod blocks;
mod conflicts;
mod scoring;
mod state;
mod types;
mod util;
mod validate;

pub use availability::{build_availability_map, AvailabilityMap, DayHours};
pub use blocks::find_best_block;
pub use scoring::score_assignment;
pub use state::WorkerRunState;
pub use types::{GenerateRequest, Generated, SchedError, Violation, ViolationKind};
pub use util::{dates_within_week, holiday_dates, merge_runs, time_off_dates, week_dates};

use crate::config::EngineConfig;
use crate::model::{ScheduleRun, Snapshot};

/// Scheduler : moteur glouton de génération hebdomadaire. Sans état entre deux
/// runs ; chaque appel part d'un état neuf construit depuis le snapshot.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: EngineConfig,
}

impl Scheduler {
    pub fn new(config: EngineConfig) -> Result<Self, SchedError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Génère le planning brouillon d'une semaine et ses alertes de sous-effectif.
    pub fn generate(
        &self,
        snapshot: &Snapshot,
        request: GenerateRequest,
    ) -> Result<Generated, SchedError> {
        assignment::generate(self, snapshot, request)
    }

    pub fn audit(&self, run: &ScheduleRun, snapshot: &Snapshot) -> Vec<Violation> {
        conflicts::audit(run, snapshot)
    }
}

/// Raccourci : génération avec la configuration par défaut.
pub fn generate_week(snapshot: &Snapshot, request: GenerateRequest) -> Result<Generated, SchedError> {
    Scheduler::default().generate(snapshot, request)
}
