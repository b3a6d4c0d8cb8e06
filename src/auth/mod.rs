mod middleware;
mod password;
mod session;

pub use middleware::{auth_middleware, login_rate_limit, AuthState, AuthenticatedUser};
pub use password::{hash_password, verify_against_decoy, verify_password, PasswordError};
pub use session::{
    generate_session_token, AuthRateLimiter, SessionManager, MAX_SESSION_TIMEOUT_SECONDS,
};
