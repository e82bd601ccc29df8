mod ids;
mod progress;
mod user;

pub use ids::{LessonId, ParseIdError, Username};

pub use progress::Progress;
pub use user::{Role, User, UserError};
