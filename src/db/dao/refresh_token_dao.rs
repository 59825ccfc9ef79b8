use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::refresh_token::{self, Entity as RefreshToken};

#[derive(Clone)]
pub struct RefreshTokenDao {
    db: DatabaseConnection,
}

impl DaoBase for RefreshTokenDao {
    type Entity = RefreshToken;
    const LABEL: &'static str = "Refresh token";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Methods taking `conn` run inside the caller's transaction.
impl RefreshTokenDao {
    pub async fn create_token<C>(
        &self,
        conn: &C,
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<FixedOffset>,
    ) -> DaoResult<refresh_token::Model>
    where
        C: ConnectionTrait + Sync,
    {
        let model = refresh_token::ActiveModel {
            user_id: Set(user_id),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at),
            revoked: Set(false),
            revoked_at: Set(None),
            ..Default::default()
        };
        self.create_on(conn, model).await
    }

    /// Non-revoked, unexpired tokens of one user.
    pub async fn list_active_for_user<C>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> DaoResult<Vec<refresh_token::Model>>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now().fixed_offset();
        let tokens = Self::live()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .filter(refresh_token::Column::ExpiresAt.gt(now))
            .all(conn)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(tokens.into_iter().filter(|token| token.is_usable(now)).collect())
    }

    /// Every non-revoked token in the system.
    pub async fn list_unrevoked(&self) -> DaoResult<Vec<refresh_token::Model>> {
        Self::live()
            .filter(refresh_token::Column::Revoked.eq(false))
            .all(self.db())
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Revokes `id` only if still active. Returns false when another caller
    /// got there first.
    pub async fn revoke_if_active<C>(&self, conn: &C, id: Uuid) -> DaoResult<bool>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now().fixed_offset();
        let result = RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, Expr::value(true))
            .col_expr(refresh_token::Column::RevokedAt, Expr::value(Some(now)))
            .col_expr(refresh_token::Column::UpdatedAt, Expr::value(now))
            .filter(refresh_token::Column::Id.eq(id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(conn)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected == 1)
    }

    pub async fn revoke_all_for_user<C>(&self, conn: &C, user_id: Uuid) -> DaoResult<u64>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now().fixed_offset();
        let result = RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, Expr::value(true))
            .col_expr(refresh_token::Column::RevokedAt, Expr::value(Some(now)))
            .col_expr(refresh_token::Column::UpdatedAt, Expr::value(now))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(conn)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::RefreshTokenDao;
    use crate::{
        db::dao::{DaoBase, DaoLayerError},
        test_helpers::refresh_token_model,
    };

    #[tokio::test]
    async fn list_active_for_user_drops_expired_rows() {
        let user_id = Uuid::new_v4();
        let now = Utc::now().fixed_offset();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                refresh_token_model(user_id, "hash-a", now + Duration::days(1), false),
                refresh_token_model(user_id, "hash-b", now - Duration::minutes(1), false),
            ]])
            .into_connection();
        let dao = RefreshTokenDao::new(&db);

        let tokens = dao
            .list_active_for_user(&db, user_id)
            .await
            .expect("query should succeed");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_hash, "hash-a");
    }

    #[tokio::test]
    async fn revoke_if_active_reports_lost_race() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let dao = RefreshTokenDao::new(&db);
        let id = Uuid::new_v4();

        assert!(dao.revoke_if_active(&db, id).await.expect("first revoke"));
        assert!(!dao.revoke_if_active(&db, id).await.expect("second revoke"));
    }

    #[tokio::test]
    async fn revoke_all_maps_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("update failed".to_string())])
            .into_connection();
        let dao = RefreshTokenDao::new(&db);

        let err = dao
            .revoke_all_for_user(&db, Uuid::new_v4())
            .await
            .expect_err("update should fail");
        assert!(matches!(err, DaoLayerError::Db(_)));
    }
}
