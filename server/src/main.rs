use clap::Parser;
use std::process::ExitCode;

mod api;
mod db;
mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "vulnscoped",
    about = "Vulnerability lookup and enrichment service",
    version
)]
struct Vulnscoped {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run the API server
    Api(api::Run),
    /// Manage the database
    Db(db::Run),
}

#[actix_web::main]
async fn main() -> anyhow::Result<ExitCode> {
    match Vulnscoped::parse().command {
        Command::Api(run) => run.run().await,
        Command::Db(run) => run.run().await,
    }
}
