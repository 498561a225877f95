//! Dashboard and progress-report shapes served by the platform.
//!
//! These mirror the aggregation endpoints verbatim; the client does not
//! recompute any of the percentages.

use serde::{Deserialize, Serialize};

use super::{AssignedModule, ModuleAssignment, UserProfile};

/// Completion counters for one trainee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeProgress {
    pub total_assigned: u32,
    pub completed: u32,
    pub pending: u32,
    pub completion_percentage: f64,
}

/// `GET dashboard/trainee/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeDashboard {
    pub user: UserProfile,
    pub progress: TraineeProgress,
    pub assigned_modules: Vec<AssignedModule>,
}

/// Per-trainee completion line on the instructor dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeCompletion {
    pub id: i64,
    pub username: String,
    pub completion_percentage: u32,
}

/// Per-module assignment stats on the instructor dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleStats {
    pub id: i64,
    pub title: String,
    pub assigned_count: u32,
    pub completed_count: u32,
    pub completion_rate: f64,
}

/// Trainee counts bucketed by completion percentage. The server keys the
/// buckets by their lower bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressDistribution {
    #[serde(rename = "0")]
    pub none: u32,
    #[serde(rename = "25")]
    pub quarter: u32,
    #[serde(rename = "50")]
    pub half: u32,
    #[serde(rename = "75")]
    pub three_quarters: u32,
    #[serde(rename = "100")]
    pub complete: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentStatusSummary {
    pub completed: u32,
    pub in_progress: u32,
    pub not_started: u32,
    pub total: u32,
}

/// `GET dashboard/instructor/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorDashboard {
    pub total_trainees: u32,
    pub total_modules: u32,
    pub assigned_modules_count: u32,
    pub unassigned_modules_count: u32,
    pub trainees: Vec<TraineeCompletion>,
    pub modules: Vec<ModuleStats>,
    pub progress_distribution: ProgressDistribution,
    pub assignment_status_summary: AssignmentStatusSummary,
}

/// `GET instructor/trainees/<id>/progress/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraineeProgressReport {
    pub trainee: UserProfile,
    pub total_assigned: u32,
    pub completed: u32,
    pub pending: u32,
    pub completion_percentage: f64,
    pub assignments: Vec<ModuleAssignment>,
}

/// Result of bulk-assigning a module to a set of trainees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub assigned: Vec<i64>,
    pub total_requested: u32,
    pub successfully_assigned: u32,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl AssignmentOutcome {
    pub fn all_assigned(&self) -> bool {
        self.successfully_assigned == self.total_requested
    }
}
