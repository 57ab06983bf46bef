use hide::Hide;

/// Database connection configuration.
#[derive(clap::Args, Debug, Clone)]
#[command(next_help_heading = "Database")]
pub struct Database {
    /// A full connection URL, overriding the individual settings
    #[arg(id = "db-url", long, env = "VULNSCOPE_DB_URL")]
    pub url: Option<String>,
    #[arg(
        id = "db-user",
        long,
        env = "VULNSCOPE_DB_USER",
        default_value = "postgres"
    )]
    pub username: String,
    #[arg(
        id = "db-password",
        long,
        env = "VULNSCOPE_DB_PASSWORD",
        default_value = "vulnscope"
    )]
    pub password: Hide<String>,
    #[arg(
        id = "db-host",
        long,
        env = "VULNSCOPE_DB_HOST",
        default_value = "localhost"
    )]
    pub host: String,
    #[arg(id = "db-port", long, env = "VULNSCOPE_DB_PORT", default_value_t = 5432)]
    pub port: u16,
    #[arg(
        id = "db-name",
        long,
        env = "VULNSCOPE_DB_NAME",
        default_value = "vulnscope"
    )]
    pub name: String,
}

impl Database {
    /// Evaluate the configuration from the environment only.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        #[derive(clap::Parser)]
        struct Env {
            #[command(flatten)]
            database: Database,
        }

        Ok(<Env as clap::Parser>::try_parse_from(["env"])?.database)
    }

    pub fn to_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{username}:{password}@{host}:{port}/{name}",
                username = self.username,
                password = self.password.0,
                host = self.host,
                port = self.port,
                name = self.name,
            ),
        }
    }
}
