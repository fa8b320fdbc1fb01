use clap::{Parser, Subcommand};

mod db;
mod order;

#[derive(Debug, Parser)]
#[command(name = "checkout-app", about = "Checkout CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Order(order::OrderCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Order(command) => order::run(command).await,
        }
    }
}
