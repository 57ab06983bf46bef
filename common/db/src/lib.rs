pub mod embedded;

use anyhow::ensure;
use migration::Migrator;
use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::MigratorTrait;
use tracing::instrument;
use vulnscope_common::{config, db};

pub struct Database<'a>(pub &'a db::Database);

impl<'a> Database<'a> {
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        log::debug!("applying migrations");
        Migrator::up(self.0.connection(), None).await?;
        log::debug!("applied migrations");

        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn refresh(&self) -> Result<(), anyhow::Error> {
        log::warn!("refreshing database schema...");
        Migrator::refresh(self.0.connection()).await?;
        log::warn!("refreshing database schema... done!");

        Ok(())
    }

    /// Drop and re-create the database, without applying migrations.
    #[instrument(err)]
    pub async fn setup(database: &config::Database) -> Result<db::Database, anyhow::Error> {
        ensure!(
            database.url.is_none(),
            "Unable to bootstrap database with '--db-url'"
        );

        let url = config::Database {
            name: "postgres".into(),
            ..database.clone()
        }
        .to_url();

        let db = sea_orm::Database::connect(url).await?;

        db.execute(Statement::from_string(
            db.get_database_backend(),
            format!("DROP DATABASE IF EXISTS \"{}\";", database.name),
        ))
        .await?;

        db.execute(Statement::from_string(
            db.get_database_backend(),
            format!("CREATE DATABASE \"{}\";", database.name),
        ))
        .await?;
        db.close().await?;

        db::Database::new(database).await
    }

    #[instrument(err)]
    pub async fn bootstrap(database: &config::Database) -> Result<db::Database, anyhow::Error> {
        let db = Self::setup(database).await?;

        Database(&db).migrate().await?;

        Ok(db)
    }
}
