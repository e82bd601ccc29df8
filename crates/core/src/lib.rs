#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod leveling;
pub mod model;
pub mod roster;
pub mod session;

pub use error::Error;
pub use leveling::{LevelState, compute_level};
pub use roster::build_roster;
pub use session::{SessionContext, SessionError};
