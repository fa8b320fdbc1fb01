//! Database Config

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Maximum pooled connections.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10_u32)]
    pub database_max_connections: u32,

    /// Connections kept open while idle.
    #[arg(long, env = "DATABASE_MIN_CONNECTIONS", default_value_t = 2_u32)]
    pub database_min_connections: u32,

    /// Seconds to wait for a pooled connection.
    #[arg(long, env = "DATABASE_ACQUIRE_TIMEOUT_SECONDS", default_value_t = 5_u64)]
    pub database_acquire_timeout_seconds: u64,

    /// Deadline for a single checkout, status change or reconciliation.
    #[arg(long, env = "UNIT_OF_WORK_TIMEOUT_MS", default_value_t = 5_000_u64)]
    pub unit_of_work_timeout_ms: u64,

    /// Apply pending migrations before serving.
    #[arg(long, env = "RUN_MIGRATIONS", default_value_t = false)]
    pub run_migrations: bool,
}
