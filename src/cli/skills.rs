use clap::Subcommand;
use sqlx::SqlitePool;

use crate::storage::{SkillStore, SqliteSkillStore};
use crate::validation::{self, SKILL_NAME_LEN};

/// Skill catalogue subcommands
#[derive(Subcommand)]
pub enum SkillCommands {
    /// Add a skill to the catalogue
    Add {
        /// Skill name
        name: String,
    },

    /// List all skills
    List,
}

impl SkillCommands {
    pub async fn execute(self, pool: SqlitePool) -> anyhow::Result<()> {
        let skill_store = SqliteSkillStore::new(pool);

        match self {
            SkillCommands::Add { name } => {
                let name = validation::text_field("name", &name, SKILL_NAME_LEN)?;
                let skill = skill_store.create_skill(&name).await?;
                println!("✅ Skill {} created with id {}.", skill.name, skill.id);
            }
            SkillCommands::List => {
                for skill in skill_store.list_skills().await? {
                    println!("{:<8} {}", skill.id, skill.name);
                }
            }
        }

        Ok(())
    }
}
