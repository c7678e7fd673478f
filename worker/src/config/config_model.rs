#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}
