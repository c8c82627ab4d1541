use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::task_status::TaskStatus;

/// Input for a task.
///
/// `project_id: Some(0)` detaches the task from its project; `None` leaves
/// the current project untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(range(min = 0))]
    pub project_id: Option<i64>,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub due_at: Option<DateTime<Utc>>,
}
