use anyhow::Result;
use crates::domain::value_objects::payments::PricingRates;

use super::config_model::{Auth, BackendServer, Database, DotEnvyConfig};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: std::env::var("SERVER_PORT_BACKEND")
            .expect("SERVER_PORT_BACKEND is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let auth = Auth {
        jwt_secret: std::env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET is invalid"),
    };

    let defaults = PricingRates::default();
    let payment_rates = PricingRates {
        vat_rate: rate_env("PAYMENT_VAT_RATE", defaults.vat_rate)?,
        service_fee_rate: rate_env("PAYMENT_SERVICE_FEE_RATE", defaults.service_fee_rate)?,
        commission_rate: rate_env("PAYMENT_PLATFORM_COMMISSION_RATE", defaults.commission_rate)?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        auth,
        payment_rates,
    })
}

pub fn get_auth_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    Ok(std::env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET is invalid"))
}

fn rate_env(key: &str, default: f64) -> Result<f64> {
    match std::env::var(key) {
        Ok(value) => Ok(value.parse()?),
        Err(_) => Ok(default),
    }
}
