use secrecy::Secret;
use serde::Deserialize;
use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;

pub const MIDTRANS_SANDBOX_URL: &str = "https://api.sandbox.midtrans.com";

#[derive(Debug, Clone, Deserialize)]
pub struct OrderServiceConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub midtrans: MidtransConfig,
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MidtransConfig {
    /// Used for Basic auth on the Core API and as the notification signing secret.
    pub server_key: Secret<String>,
    pub api_base_url: String,
    pub shopeepay_callback_url: String,
}

impl OrderServiceConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();

        Ok(OrderServiceConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: Secret::new(get_env(
                    "MONGODB_URI",
                    Some("mongodb://localhost:27017/?replicaSet=rs0"),
                    is_prod,
                )?),
                database: get_env("MONGODB_DATABASE", Some("restaurant_db"), is_prod)?,
            },
            midtrans: MidtransConfig {
                server_key: Secret::new(get_env("MIDTRANS_SERVER_KEY", Some(""), is_prod)?),
                api_base_url: get_env(
                    "MIDTRANS_API_BASE_URL",
                    Some(MIDTRANS_SANDBOX_URL),
                    is_prod,
                )?,
                shopeepay_callback_url: get_env(
                    "MIDTRANS_SHOPEEPAY_CALLBACK_URL",
                    Some("http://localhost:8080/shopeepay/callback"),
                    is_prod,
                )?,
            },
            service_name: "order-service".to_string(),
        })
    }
}
