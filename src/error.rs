#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("Corrupt {column} value in user_progress: {detail}")]
    Corrupt {
        column: &'static str,
        detail: String,
    },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
