use std::env::var;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub frontend_url: String,
    pub jwt_secret: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
    pub idle_timeout: u64,
}

impl Config {
    pub fn init() -> Self {
        let database_url = var("DATABASE_URL").expect("DATABASE_URL must be set");
        let frontend_url = var("FRONTEND_URL").expect("FRONTEND_URL must be set");
        let jwt_secret = var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let max_connections = var("MAX_CONNECTIONS").expect("MAX_CONNECTIONS must be set");
        let min_connections = var("MIN_CONNECTIONS").expect("MIN_CONNECTIONS must be set");
        let acquire_timeout = var("ACQUIRE_TIMEOUT").expect("ACQUIRE_TIMEOUT must be set");
        let idle_timeout = var("IDLE_TIMEOUT").expect("IDLE_TIMEOUT must be set");
        Self {
            port: 4000,
            database_url,
            frontend_url,
            jwt_secret,
            max_connections: max_connections.parse::<u32>().unwrap(),
            min_connections: min_connections.parse::<u32>().unwrap(),
            acquire_timeout: acquire_timeout.parse::<u64>().unwrap(),
            idle_timeout: idle_timeout.parse::<u64>().unwrap(),
        }
    }
}
