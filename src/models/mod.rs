//! Scheduling domain models.
//!
//! | focus-schedule | Pomodoro app | Single machine theory |
//! |----------------|--------------|-----------------------|
//! | TaskRecord | Task in a session | Job |
//! | session_id | Pomodoro session | Chain (precedence) |
//! | ScheduledTask | Planned task + break | Job in a sequence |

mod schedule;
mod task;

pub use schedule::{ScheduledTask, into_records, schedule_ids};
pub use task::{MAX_COGNITIVE_LOAD, MIN_COGNITIVE_LOAD, TaskRecord};
