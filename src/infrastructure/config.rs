use std::env;

/// Placeholder replaced by the tenant id in `DATABASE_URL`
pub const TENANT_PLACEHOLDER: &str = "{tenant}";

#[derive(Clone)]
pub struct Config {
    /// Connection URL template, one database per tenant
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!(
                "sqlite://{}_mod_circulation_storage.db?mode=rwc",
                TENANT_PLACEHOLDER
            )
        });

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
        }
    }
}
