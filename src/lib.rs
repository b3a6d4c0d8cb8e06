pub mod auth;
pub mod cli;
pub mod config;
pub mod handlers;
pub mod matching;
pub mod routes;
pub mod state;
pub mod storage;
pub mod validation;

pub use config::ServerConfig;
pub use routes::build_router;
pub use state::ServerState;
