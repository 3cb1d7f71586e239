use std::sync::Arc;

use crate::{
    config::AuthSettings,
    db::{DbPool, OrmConn, create_orm_conn},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub auth: Arc<AuthSettings>,
}

impl AppState {
    pub fn new(pool: DbPool, auth: AuthSettings) -> Self {
        let orm = create_orm_conn(&pool);
        Self {
            pool,
            orm,
            auth: Arc::new(auth),
        }
    }
}
