mod jobs;
mod skills;
mod sqlite;
mod traits;
mod types;
mod users;

pub use jobs::SqliteJobStore;
pub use skills::SqliteSkillStore;
pub use sqlite::{connect, initialize_schema};
pub use traits::{JobStore, SkillStore, StorageError, StorageResult};
pub use types::*;
pub use users::{NewUser, SqliteUserStore, User, UserStore};
