use crate::model::{ScheduleId, ScheduleRun, ScheduleStatus, ShiftBlock, ShiftId, ShiftStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("unknown schedule: {0}")]
    UnknownSchedule(String),
    #[error("only draft schedules can be published (schedule {0} is {1})")]
    NotDraft(String, ScheduleStatus),
    #[error("cannot delete published schedule {0}")]
    PublishedDelete(String),
    #[error("unknown shift {1} in schedule {0}")]
    UnknownShift(String, String),
    #[error("shift status can only change on a published schedule (schedule {0} is {1})")]
    NotPublished(String, ScheduleStatus),
}

/// Registre des plannings générés. Au plus un planning est `published`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleBook {
    #[serde(default)]
    runs: Vec<ScheduleRun>,
}

impl ScheduleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, run: ScheduleRun) {
        self.runs.push(run);
    }

    pub fn find(&self, id: &ScheduleId) -> Option<&ScheduleRun> {
        self.runs.iter().find(|r| &r.id == id)
    }

    fn position(&self, id: &ScheduleId) -> Result<usize, LifecycleError> {
        self.runs
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| LifecycleError::UnknownSchedule(id.to_string()))
    }

    /// Publie un brouillon ; le planning publié précédent est archivé.
    pub fn publish(&mut self, id: &ScheduleId) -> Result<&ScheduleRun, LifecycleError> {
        let pos = self.position(id)?;
        let status = self.runs[pos].status;
        if status != ScheduleStatus::Draft {
            return Err(LifecycleError::NotDraft(id.to_string(), status));
        }

        for run in self.runs.iter_mut() {
            if run.status == ScheduleStatus::Published {
                info!(schedule = %run.id, "archiving previously published schedule");
                run.status = ScheduleStatus::Archived;
            }
        }
        self.runs[pos].status = ScheduleStatus::Published;
        Ok(&self.runs[pos])
    }

    pub fn archive(&mut self, id: &ScheduleId) -> Result<&ScheduleRun, LifecycleError> {
        let pos = self.position(id)?;
        self.runs[pos].status = ScheduleStatus::Archived;
        Ok(&self.runs[pos])
    }

    pub fn remove(&mut self, id: &ScheduleId) -> Result<ScheduleRun, LifecycleError> {
        let pos = self.position(id)?;
        if self.runs[pos].status == ScheduleStatus::Published {
            return Err(LifecycleError::PublishedDelete(id.to_string()));
        }
        Ok(self.runs.remove(pos))
    }

    /// Suivi d'un bloc après publication (effectué, manqué, échangé).
    pub fn set_shift_status(
        &mut self,
        schedule: &ScheduleId,
        shift: &ShiftId,
        status: ShiftStatus,
    ) -> Result<&ShiftBlock, LifecycleError> {
        let pos = self.position(schedule)?;
        let run = &mut self.runs[pos];
        if run.status != ScheduleStatus::Published {
            return Err(LifecycleError::NotPublished(schedule.to_string(), run.status));
        }
        let block = run
            .shifts
            .iter_mut()
            .find(|s| &s.id == shift)
            .ok_or_else(|| LifecycleError::UnknownShift(schedule.to_string(), shift.to_string()))?;
        info!(schedule = %schedule, shift = %shift, %status, "shift status updated");
        block.status = status;
        Ok(&*block)
    }

    /// Planning publié courant (semaine la plus récente).
    pub fn current(&self) -> Option<&ScheduleRun> {
        self.runs
            .iter()
            .filter(|r| r.status == ScheduleStatus::Published)
            .max_by_key(|r| r.week_start)
    }

    /// Plannings du plus récent au plus ancien, éventuellement filtrés par statut.
    pub fn list(&self, status: Option<ScheduleStatus>) -> Vec<&ScheduleRun> {
        let mut out: Vec<&ScheduleRun> = self
            .runs
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect();
        out.sort_by(|a, b| b.week_start.cmp(&a.week_start));
        out
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
