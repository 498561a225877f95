//! Data models for Traindesk entities.
//!
//! This module contains the data structures exchanged with the platform:
//!
//! - `UserProfile`, `Role`: accounts and their platform role
//! - `TrainingModule`, `ModuleAssignment`: authored modules and who they
//!   are assigned to
//! - Dashboard types: `TraineeDashboard`, `InstructorDashboard`,
//!   `TraineeProgressReport`
//! - `Message`, `MessageLog`: messaging with optimistic local sends

pub mod dashboard;
pub mod message;
pub mod module;
pub mod user;

pub use dashboard::{
    AssignmentOutcome, AssignmentStatusSummary, InstructorDashboard, ModuleStats,
    ProgressDistribution, TraineeCompletion, TraineeDashboard, TraineeProgress,
    TraineeProgressReport,
};
pub use message::{Message, MessageEntry, MessageLog, PendingMessage};
pub use module::{AssignedModule, ModuleAssignment, NewModule, TrainingModule};
pub use user::{ProfileUpdate, Registration, Role, UserProfile};
