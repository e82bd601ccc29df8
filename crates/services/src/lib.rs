#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod events;
pub mod progress_service;
pub mod quiz_service;
pub mod roster_service;
pub mod session_service;

pub use app_services::AppServices;
pub use error::{AppServicesError, LoginError, ProgressError, QuizError, RosterError};
pub use events::{ProgressEvents, ProgressUpdated};
pub use progress_service::{ProgressService, StudentSummary};
pub use quiz_service::{QuizOutcome, QuizService};
pub use roster_service::{RosterService, RosterWatch};
pub use session_service::{RedirectReason, SessionService, ViewAccess};
