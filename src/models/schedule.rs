//! Schedule (solution) model.
//!
//! An ordered list of tasks, each paired with the break the optimizer
//! suggests taking after it.

use serde::{Deserialize, Serialize};

use super::TaskRecord;

/// A task placed in a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// The scheduled task (a copy of the input record).
    pub task: TaskRecord,
    /// Suggested break after the task (minutes).
    pub suggested_break_minutes: u32,
}

impl ScheduledTask {
    /// Places a task with no break.
    pub fn without_break(task: TaskRecord) -> Self {
        Self {
            task,
            suggested_break_minutes: 0,
        }
    }

    /// Places a task with the given break.
    pub fn with_break(task: TaskRecord, minutes: u32) -> Self {
        Self {
            task,
            suggested_break_minutes: minutes,
        }
    }

    /// Task duration plus its suggested break (minutes).
    pub fn occupied_minutes(&self) -> u32 {
        self.task
            .estimated_duration_minutes
            .saturating_add(self.suggested_break_minutes)
    }
}

/// Task IDs of a schedule, in order.
pub fn schedule_ids(schedule: &[ScheduledTask]) -> Vec<i64> {
    schedule.iter().map(|s| s.task.id).collect()
}

/// Strips break suggestions, returning the ordered task records.
pub fn into_records(schedule: Vec<ScheduledTask>) -> Vec<TaskRecord> {
    schedule.into_iter().map(|s| s.task).collect()
}
