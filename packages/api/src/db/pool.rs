//! Process-wide PostgreSQL pool, opened on first use.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Connection settings: `DATABASE_URL` and optionally `DATABASE_MAX_CONNECTIONS`.
#[derive(Debug, Clone, PartialEq)]
struct PoolSettings {
    url: String,
    max_connections: u32,
}

impl PoolSettings {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, sqlx::Error> {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;
        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    sqlx::Error::Configuration(
                        format!("DATABASE_MAX_CONNECTIONS must be a positive number, got {raw:?}")
                            .into(),
                    )
                })?,
        };
        Ok(Self {
            url,
            max_connections,
        })
    }
}

/// The shared pool. A failed first connect is retried on the next call.
pub async fn get_pool() -> Result<&'static PgPool, sqlx::Error> {
    POOL.get_or_try_init(|| async {
        dotenvy::dotenv().ok();
        let settings = PoolSettings::from_lookup(|name| std::env::var(name).ok())?;

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await?;
        tracing::info!(max_connections = settings.max_connections, "database pool ready");
        Ok(pool)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<PoolSettings, sqlx::Error> {
        PoolSettings::from_lookup(|name| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        })
    }

    #[test]
    fn test_missing_url_is_a_configuration_error() {
        let err = settings(&[]).unwrap_err();
        assert!(matches!(err, sqlx::Error::Configuration(_)));
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_max_connections_defaults_and_overrides() {
        let url = ("DATABASE_URL", "postgres://localhost/medicolog");
        assert_eq!(settings(&[url]).unwrap().max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            settings(&[url, ("DATABASE_MAX_CONNECTIONS", "12")])
                .unwrap()
                .max_connections,
            12
        );
        assert!(settings(&[url, ("DATABASE_MAX_CONNECTIONS", "0")]).is_err());
    }
}
