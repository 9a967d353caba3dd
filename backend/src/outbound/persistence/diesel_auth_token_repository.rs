//! PostgreSQL-backed `AuthTokenRepository` implementation.
//!
//! `auth_tokens` holds one row per user; rotation upserts on `user_id`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AuthTokenPersistenceError, AuthTokenRepository};
use crate::domain::{TokenDigest, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewAuthTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::auth_tokens;

/// Diesel-backed token store keyed by token digest.
#[derive(Clone)]
pub struct DieselAuthTokenRepository {
    pool: DbPool,
}

impl DieselAuthTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthTokenPersistenceError {
    map_basic_pool_error(error, AuthTokenPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AuthTokenPersistenceError {
    map_basic_diesel_error(
        error,
        AuthTokenPersistenceError::query,
        AuthTokenPersistenceError::connection,
    )
}

#[async_trait]
impl AuthTokenRepository for DieselAuthTokenRepository {
    async fn rotate(
        &self,
        owner: &UserId,
        digest: &TokenDigest,
    ) -> Result<(), AuthTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(auth_tokens::table)
            .values(&NewAuthTokenRow {
                digest: digest.as_str(),
                user_id: *owner.as_uuid(),
            })
            .on_conflict(auth_tokens::user_id)
            .do_update()
            .set((
                auth_tokens::digest.eq(excluded(auth_tokens::digest)),
                auth_tokens::created_at.eq(excluded(auth_tokens::created_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_owner(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, AuthTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        auth_tokens::table
            .filter(auth_tokens::digest.eq(digest.as_str()))
            .select(auth_tokens::user_id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()
            .map(|owner| owner.map(UserId::from))
            .map_err(map_diesel_error)
    }
}
