use thiserror::Error;

use crate::model::ParseIdError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidId(#[from] ParseIdError),
}
