mod auth;
mod error;
mod health;
mod jobs;
mod responses;
mod skills;
mod users;

pub use auth::*;
pub use error::{ApiError, ErrorResponse};
pub use health::*;
pub use jobs::*;
pub use responses::*;
pub use skills::*;
pub use users::*;
