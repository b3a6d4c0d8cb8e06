mod skills;
mod users;

pub use skills::SkillCommands;
pub use users::UserCommands;

use clap::{Parser, Subcommand};

/// GeoObra Server - jobs matched to workers by skills and proximity
#[derive(Parser)]
#[command(name = "geoobra-server")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the server (default)
    Serve,

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Skill catalogue commands
    #[command(subcommand)]
    Skill(SkillCommands),
}

/// Truncate string to max length with ellipsis
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
