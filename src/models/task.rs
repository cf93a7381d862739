//! Task record model.
//!
//! A task record is one unit of pending work for a single user. Records
//! are supplied fresh for every scheduling call and are never mutated by
//! the optimizer or the baselines.
//!
//! # Time Representation
//! Durations are whole minutes. Due dates are absolute UTC timestamps;
//! the scheduler measures lateness against a reference "now".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest cognitive load level.
pub const MIN_COGNITIVE_LOAD: u8 = 1;
/// Highest cognitive load level.
pub const MAX_COGNITIVE_LOAD: u8 = 5;

fn default_cognitive_load() -> u8 {
    MIN_COGNITIVE_LOAD
}

/// A task to be ordered.
///
/// Tasks sharing a `session_id` form a FIFO queue ordered by
/// `intra_session_order`; that relative order is preserved by every
/// schedule the optimizer produces. Tasks without a session form one
/// implicit group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Unique, stable task identifier.
    pub id: i64,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Estimated processing time in minutes (positive).
    pub estimated_duration_minutes: u32,
    /// Due date. `None` = no deadline.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Cognitive load, 1 (light) to 5 (very demanding).
    #[serde(default = "default_cognitive_load")]
    pub cognitive_load: u8,
    /// Session grouping. `None` = implicit default group.
    #[serde(default)]
    pub session_id: Option<i64>,
    /// Position within the session queue.
    #[serde(default)]
    pub intra_session_order: i32,
    /// Completed tasks are excluded from scheduling.
    #[serde(default)]
    pub completed: bool,
}

impl TaskRecord {
    /// Creates a pending task with the given ID and duration.
    pub fn new(id: i64, estimated_duration_minutes: u32) -> Self {
        Self {
            id,
            name: String::new(),
            estimated_duration_minutes,
            due_date: None,
            cognitive_load: MIN_COGNITIVE_LOAD,
            session_id: None,
            intra_session_order: 0,
            completed: false,
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the due date.
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the cognitive load.
    ///
    /// Stored as given; every consumer reads [`clamped_load`](Self::clamped_load).
    pub fn with_cognitive_load(mut self, load: u8) -> Self {
        self.cognitive_load = load;
        self
    }

    /// Places the task in a session at the given queue position.
    pub fn with_session(mut self, session_id: i64, order: i32) -> Self {
        self.session_id = Some(session_id);
        self.intra_session_order = order;
        self
    }

    /// Marks the task completed.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Whether the task still needs scheduling.
    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// Cognitive load clamped into `1..=5`.
    pub fn clamped_load(&self) -> u8 {
        self.cognitive_load
            .clamp(MIN_COGNITIVE_LOAD, MAX_COGNITIVE_LOAD)
    }

    /// Quadratic importance weight: `w = clamped_load²`.
    pub fn weight(&self) -> f64 {
        let load = f64::from(self.clamped_load());
        load * load
    }

    /// Duration floored at one minute, used wherever a duration divides.
    pub fn effective_duration(&self) -> u32 {
        self.estimated_duration_minutes.max(1)
    }
}
