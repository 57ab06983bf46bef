use crate::config;
use anyhow::Context;
use sea_orm::{
    ConnectOptions, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, ExecResult, QueryResult,
    Statement,
};
use tracing::instrument;

/// A shared handle to the database connection pool.
///
/// Implements [`ConnectionTrait`] so it can be handed to services the same
/// way a plain connection or transaction would be.
#[derive(Clone, Debug)]
pub struct Database {
    db: DatabaseConnection,
    pub name: String,
}

impl Database {
    #[instrument(err)]
    pub async fn new(database: &config::Database) -> Result<Self, anyhow::Error> {
        let url = database.to_url();

        let mut options = ConnectOptions::new(url);
        options.sqlx_logging_level(log::LevelFilter::Trace);

        let db = sea_orm::Database::connect(options)
            .await
            .context("connecting to the database")?;

        Ok(Self {
            db,
            name: database.name.clone(),
        })
    }

    /// Access the underlying connection, e.g. for running migrations.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        self.db.ping().await
    }

    pub async fn close(self) -> Result<(), DbErr> {
        self.db.close().await
    }
}

#[async_trait::async_trait]
impl ConnectionTrait for Database {
    fn get_database_backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.db.execute(stmt).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.db.execute_unprepared(sql).await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.db.query_one(stmt).await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.db.query_all(stmt).await
    }
}
