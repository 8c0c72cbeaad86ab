use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("Config: {}", .0)]
    Config(#[from] resa_core::config::ConfigError),

    #[error("Database: {}", .0)]
    Db(#[from] resa_core::db::DbError),

    #[error("{}", .0)]
    Auth(#[from] resa_core::auth::AuthError),
}
