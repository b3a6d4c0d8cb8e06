use clap::Subcommand;
use rand::seq::SliceRandom;
use sqlx::SqlitePool;

use super::truncate;
use crate::auth::hash_password;
use crate::storage::{NewUser, SqliteUserStore, UserStore};
use crate::validation::{self, USER_NAME_LEN};

/// User management subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user
    Create {
        /// User's email address
        #[arg(short, long)]
        email: String,

        /// User's display name
        #[arg(short, long)]
        name: String,

        /// Password (if not provided, a random one will be generated)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all users
    List,

    /// Show user details
    Show {
        /// User's email address
        email: String,
    },
}

impl UserCommands {
    pub async fn execute(self, pool: SqlitePool) -> anyhow::Result<()> {
        let user_store = SqliteUserStore::new(pool);

        match self {
            UserCommands::Create {
                email,
                name,
                password,
            } => {
                let name = validation::text_field("name", &name, USER_NAME_LEN)?;
                let email = validation::email(&email)?;
                let password = password.unwrap_or_else(generate_password);
                validation::password(&password)?;
                let password_hash = hash_password(&password)?;

                let user = user_store
                    .create_user(NewUser {
                        name,
                        email,
                        password_hash,
                    })
                    .await?;

                println!("✅ User {} created.", user.email);
                println!();
                println!("   ID:       {}", user.id);
                println!("   Email:    {}", user.email);
                println!("   Name:     {}", user.name);
                println!("   Password: {}", password);
            }

            UserCommands::List => {
                let users = user_store.list_users().await?;

                if users.is_empty() {
                    println!("No users found.");
                    return Ok(());
                }

                println!("{:<8} {:<30} {:<24} {:<20}", "ID", "Email", "Name", "Created");
                println!("{}", "-".repeat(85));
                for user in users {
                    println!(
                        "{:<8} {:<30} {:<24} {:<20}",
                        user.id,
                        truncate(&user.email, 28),
                        truncate(&user.name, 22),
                        user.created_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }

            UserCommands::Show { email } => {
                let email = validation::email(&email)?;
                let user = user_store.get_user_by_email(&email).await?;
                let profile = user_store.get_profile(user.id).await?;

                println!("{}", user.name);
                println!("  ID:       {}", user.id);
                println!("  Email:    {}", user.email);
                println!("  Name:     {}", user.name);
                println!("  Created:  {}", user.created_at);
                match profile.address {
                    Some(address) => println!(
                        "  Address:  {}, {} - {} {} ({:.5}, {:.5})",
                        address.street,
                        address.city,
                        address.state,
                        address.zip_code,
                        address.latitude,
                        address.longitude
                    ),
                    None => println!("  Address:  -"),
                }
                let skills: Vec<String> = profile.skills.into_iter().map(|s| s.name).collect();
                println!(
                    "  Skills:   {}",
                    if skills.is_empty() {
                        "-".to_string()
                    } else {
                        skills.join(", ")
                    }
                );
            }
        }

        Ok(())
    }
}

const GENERATED_PASSWORD_LEN: usize = 16;

/// Random password drawn from an alphabet without look-alike characters
fn generate_password() -> String {
    const ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789-_!@#%";
    let mut rng = rand::thread_rng();

    (0..GENERATED_PASSWORD_LEN)
        .filter_map(|_| ALPHABET.choose(&mut rng))
        .map(|&b| char::from(b))
        .collect()
}
