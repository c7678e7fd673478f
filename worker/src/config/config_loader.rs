use anyhow::Result;

use super::config_model::{Database, DotEnvyConfig, WorkerServer};

const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: std::env::var("SERVER_PORT_WORKER")
            .expect("SERVER_PORT_WORKER is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let sweep_interval_seconds = match std::env::var("SWEEP_INTERVAL_SECONDS") {
        Ok(value) => value.parse()?,
        Err(_) => DEFAULT_SWEEP_INTERVAL_SECONDS,
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        sweep_interval_seconds,
    })
}
