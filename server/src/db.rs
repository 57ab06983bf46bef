use std::process::ExitCode;
use vulnscope_common::{config::Database, db};

#[derive(clap::Args, Debug)]
pub struct Run {
    #[command(subcommand)]
    pub(crate) command: Command,
    #[command(flatten)]
    pub(crate) database: Database,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Create database
    Create,
    /// Run migrations (up)
    Migrate,
    /// Remove all migrations and re-apply them (DANGER)
    Refresh,
}

impl Run {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        crate::logging::init("db-run");
        use Command::*;
        match self.command {
            Create => self.create().await,
            Migrate => self.migrate().await,
            Refresh => self.refresh().await,
        }
    }

    async fn create(self) -> anyhow::Result<ExitCode> {
        match vulnscope_db::Database::bootstrap(&self.database).await {
            Ok(_) => Ok(ExitCode::SUCCESS),
            Err(e) => Err(e),
        }
    }

    async fn migrate(self) -> anyhow::Result<ExitCode> {
        match db::Database::new(&self.database).await {
            Ok(db) => {
                vulnscope_db::Database(&db).migrate().await?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh(self) -> anyhow::Result<ExitCode> {
        match db::Database::new(&self.database).await {
            Ok(db) => {
                vulnscope_db::Database(&db).refresh().await?;
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Err(e),
        }
    }
}
