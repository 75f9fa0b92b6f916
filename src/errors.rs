use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ValorisError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(valoris::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(valoris::config))]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    #[diagnostic(code(valoris::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("{0}")]
    #[diagnostic(code(valoris::other))]
    Other(String),
}
