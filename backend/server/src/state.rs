use std::sync::Arc;

use rusqlite::Connection;
use tokio::task::spawn_blocking;

use super::{
    config::Config,
    database::{DbError, Pool, init_pool},
    error::AppError,
};

pub struct State {
    pub config: Config,
    pub pool: Pool,
}

impl State {
    pub fn new(config: Config) -> Result<Arc<Self>, DbError> {
        let pool = init_pool(&config.database_path, config.pool_size)?;

        Ok(Self::from_parts(config, pool))
    }

    pub fn from_parts(config: Config, pool: Pool) -> Arc<Self> {
        Arc::new(Self { config, pool })
    }

    /// Runs `f` on a pooled connection off the async runtime.
    pub async fn db<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        spawn_blocking(move || {
            let mut conn = pool.get().map_err(DbError::from)?;
            f(&mut *conn)
        })
        .await
        .map_err(DbError::from)?
    }
}
