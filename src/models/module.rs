//! Training modules and their assignments to trainees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserProfile;

/// A training module authored by an instructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TrainingModule {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub duration_minutes: i32,
    pub created_by: UserProfile,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingModule {
    /// Duration formatted for display, e.g. "1h 30m".
    pub fn duration_display(&self) -> String {
        let hours = self.duration_minutes / 60;
        let minutes = self.duration_minutes % 60;
        if hours > 0 && minutes > 0 {
            format!("{}h {}m", hours, minutes)
        } else if hours > 0 {
            format!("{}h", hours)
        } else {
            format!("{}m", minutes)
        }
    }
}

/// Create/update payload for a training module.
#[derive(Debug, Clone, Serialize)]
pub struct NewModule {
    pub title: String,
    pub description: String,
    pub content: String,
    pub duration_minutes: i32,
}

/// A module assigned to a trainee, with completion tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ModuleAssignment {
    pub id: i64,
    pub trainee: UserProfile,
    pub module: TrainingModule,
    pub assigned_by: UserProfile,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_at: DateTime<Utc>,
}

/// Trainee-dashboard projection of an assignment: the trainee themself is
/// implicit and the assigning instructor is omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct AssignedModule {
    pub id: i64,
    pub module: TrainingModule,
    pub is_completed: bool,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
