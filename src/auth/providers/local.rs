use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};

use crate::{
    auth::{
        Claims, Role, TokenBundle,
        jwt::{JwtKeys, decode_access, decode_expired, encode_token, make_access_claims},
        password::{
            generate_refresh_token, hash_password, hash_refresh_token, verify_password,
            verify_refresh_token,
        },
    },
    config::{AuthConfig, defaults},
    db::dao::{DaoBase, DaoLayerError, NewUser, RefreshTokenDao},
    db::entities::user,
    error::AppError,
    services::{
        user_service::UserService,
        validation::{FieldErrors, normalize_email},
    },
};

use super::{AuthProvider, AuthProviderId};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INACTIVE_ACCOUNT: &str = "User account is inactive";
const INVALID_REFRESH: &str = "Invalid refresh token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access_secs: i64,
    pub refresh_days: i64,
}

impl TokenLifetimes {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self {
            access_secs: cfg.access_ttl_secs,
            refresh_days: cfg.refresh_ttl_days,
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_secs: defaults::DEFAULT_ACCESS_TTL_SECS,
            refresh_days: defaults::DEFAULT_REFRESH_TTL_DAYS,
        }
    }
}

/// Email/password accounts with rotating, hashed refresh tokens.
///
/// A user holds at most one live refresh token after login. Refresh consumes
/// the presented token with a compare-and-set revoke inside the same
/// transaction that stores its successor.
#[derive(Clone)]
pub struct LocalAuthProvider {
    user_service: UserService,
    refresh_token_dao: RefreshTokenDao,
    jwt: JwtKeys,
    lifetimes: TokenLifetimes,
}

fn db_error(err: DbErr) -> AppError {
    DaoLayerError::from(err).into()
}

impl LocalAuthProvider {
    pub fn new(
        user_service: UserService,
        refresh_token_dao: RefreshTokenDao,
        jwt: JwtKeys,
        lifetimes: TokenLifetimes,
    ) -> Self {
        Self {
            user_service,
            refresh_token_dao,
            jwt,
            lifetimes,
        }
    }

    /// Revokes every live refresh token of `user` and issues a new pair.
    async fn start_session(&self, user: &user::Model) -> Result<TokenBundle, AppError> {
        let txn = self.refresh_token_dao.db().begin().await.map_err(db_error)?;
        let revoked = self
            .refresh_token_dao
            .revoke_all_for_user(&txn, user.id)
            .await?;
        let bundle = self.issue_on(&txn, user).await?;
        txn.commit().await.map_err(db_error)?;

        tracing::debug!(user_id = %user.id, revoked, "session started");
        Ok(bundle)
    }

    async fn issue_on<C>(&self, conn: &C, user: &user::Model) -> Result<TokenBundle, AppError>
    where
        C: ConnectionTrait + Sync,
    {
        let role = user
            .role()
            .ok_or_else(|| AppError::internal(format!("Unknown role value {}", user.role)))?;
        let claims = make_access_claims(
            &user.id,
            role,
            self.lifetimes.access_secs.max(0) as usize,
        );
        let access_token = encode_token(&self.jwt, &claims)?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)
            .ok_or_else(|| AppError::internal("Access token expiry out of range"))?;

        let refresh_token = generate_refresh_token();
        let token_hash = hash_refresh_token(&refresh_token)?;
        let refresh_expires =
            Utc::now().fixed_offset() + Duration::days(self.lifetimes.refresh_days);
        self.refresh_token_dao
            .create_token(conn, user.id, token_hash, refresh_expires)
            .await?;

        Ok(TokenBundle {
            access_token,
            refresh_token,
            expires_at,
        })
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    fn id(&self) -> AuthProviderId {
        AuthProviderId::Local
    }

    /// Public sign-up always produces an active Tenant.
    async fn register(&self, email: &str, password: &str) -> Result<TokenBundle, AppError> {
        FieldErrors::new()
            .email(email)
            .required("Password", password)
            .finish()?;

        if self.user_service.email_taken(email).await? {
            return Err(AppError::bad_request("User with this email already exists"));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .user_service
            .create_user(NewUser {
                email: normalize_email(email),
                password_hash,
                role: Role::Tenant,
                is_active: true,
                pg_id: None,
            })
            .await?;
        tracing::info!(user_id = %user.id, "tenant registered");

        self.start_session(&user).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenBundle, AppError> {
        let user = self
            .user_service
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }
        if !user.is_active {
            return Err(AppError::unauthorized(INACTIVE_ACCOUNT));
        }

        let now = Utc::now().fixed_offset();
        self.user_service.set_last_login(&user.id, &now).await?;

        self.start_session(&user).await
    }

    async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<TokenBundle, AppError> {
        let claims = decode_expired(&self.jwt, access_token)?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid token subject"))?;
        let user = self
            .user_service
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH))?;
        if !user.is_active {
            return Err(AppError::unauthorized(INACTIVE_ACCOUNT));
        }

        let txn = self.refresh_token_dao.db().begin().await.map_err(db_error)?;
        let candidates = self
            .refresh_token_dao
            .list_active_for_user(&txn, user.id)
            .await?;
        let presented = candidates
            .iter()
            .find(|candidate| verify_refresh_token(refresh_token, &candidate.token_hash))
            .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH))?;

        if !self
            .refresh_token_dao
            .revoke_if_active(&txn, presented.id)
            .await?
        {
            tracing::warn!(user_id = %user.id, token_id = %presented.id, "refresh token consumed concurrently");
            return Err(AppError::unauthorized(INVALID_REFRESH));
        }

        let bundle = self.issue_on(&txn, &user).await?;
        txn.commit().await.map_err(db_error)?;
        Ok(bundle)
    }

    /// Revokes the presented token wherever it is found. Unknown tokens are
    /// ignored so repeated logouts succeed.
    ///
    /// Tokens are stored hashed, so this runs one argon2 verification per
    /// unrevoked token in the system.
    async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        let candidates = self.refresh_token_dao.list_unrevoked().await?;
        tracing::debug!(candidates = candidates.len(), "scanning refresh tokens for logout");
        let Some(presented) = candidates
            .iter()
            .find(|candidate| verify_refresh_token(refresh_token, &candidate.token_hash))
        else {
            return Ok(());
        };

        self.refresh_token_dao
            .revoke_if_active(self.refresh_token_dao.db(), presented.id)
            .await?;
        tracing::debug!(user_id = %presented.user_id, "refresh token revoked on logout");
        Ok(())
    }

    async fn verify(&self, access_token: &str) -> Result<Claims, AppError> {
        decode_access(&self.jwt, access_token)
    }

    async fn seed_admin(&self, cfg: &AuthConfig) -> anyhow::Result<()> {
        if let Some(existing) = self
            .user_service
            .find_any_with_role(Role::SuperAdmin)
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?
        {
            tracing::info!(email = %existing.email, "super admin already present");
            return Ok(());
        }

        if self
            .user_service
            .email_taken(&cfg.admin_email)
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?
        {
            tracing::warn!(
                email = %cfg.admin_email,
                "admin email belongs to another account; skipping super admin seed"
            );
            return Ok(());
        }

        let hash = hash_password(&cfg.admin_password)
            .map_err(|err| anyhow::anyhow!("admin seed hash error: {err}"))?;
        let user = self
            .user_service
            .create_user(NewUser {
                email: normalize_email(&cfg.admin_email),
                password_hash: hash,
                role: Role::SuperAdmin,
                is_active: true,
                pg_id: None,
            })
            .await
            .map_err(|err| anyhow::anyhow!("{err}"))?;
        tracing::info!(email = %user.email, "seeded super admin");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, IntoMockRow, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::{
        auth::{
            Role,
            jwt::{JwtKeys, encode_token, make_access_claims},
            password::{hash_password, hash_refresh_token},
            providers::AuthProvider,
        },
        db::entities::{refresh_token, user},
        error::AppError,
        services::ServiceContext,
        test_helpers::{TEST_SECRET, refresh_token_model, test_auth_config, user_model},
    };

    use super::{AuthProviderId, LocalAuthProvider, TokenLifetimes};

    struct ProviderFixtureBuilder {
        mock: MockDatabase,
    }

    impl ProviderFixtureBuilder {
        fn new() -> Self {
            Self {
                mock: MockDatabase::new(DatabaseBackend::Postgres),
            }
        }

        fn with_query_results<T, I, II>(mut self, sets: II) -> Self
        where
            T: IntoMockRow,
            I: IntoIterator<Item = T>,
            II: IntoIterator<Item = I>,
        {
            self.mock = self.mock.append_query_results(sets);
            self
        }

        fn with_exec_result(mut self, rows_affected: u64) -> Self {
            self.mock = self.mock.append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected,
            }]);
            self
        }

        fn build(self) -> LocalAuthProvider {
            let db = self.mock.into_connection();
            let services = ServiceContext::new(&db);
            LocalAuthProvider::new(
                services.user(),
                services.refresh_token_dao(),
                keys(),
                TokenLifetimes::default(),
            )
        }
    }

    fn keys() -> JwtKeys {
        JwtKeys::from_secret(TEST_SECRET.as_bytes())
    }

    fn account(id: Uuid, password: &str, active: bool) -> user::Model {
        let mut model = user_model(id, "alice@example.com", Role::Tenant, None);
        model.password_hash = hash_password(password).expect("hash");
        model.is_active = active;
        model
    }

    fn stored_token(user_id: Uuid, plain: &str) -> refresh_token::Model {
        refresh_token_model(
            user_id,
            &hash_refresh_token(plain).expect("hash"),
            Utc::now().fixed_offset() + Duration::days(7),
            false,
        )
    }

    fn access_for(user_id: Uuid, ttl_secs: usize) -> String {
        encode_token(&keys(), &make_access_claims(&user_id, Role::Tenant, ttl_secs))
            .expect("token should encode")
    }

    #[test]
    fn provider_id_is_local() {
        assert_eq!(ProviderFixtureBuilder::new().build().id(), AuthProviderId::Local);
    }

    #[tokio::test]
    async fn login_rotates_out_previous_tokens() {
        let id = Uuid::new_v4();
        let user = account(id, "password123", true);
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([[user.clone()], [user.clone()], [user]])
            .with_exec_result(2)
            .with_query_results([[stored_token(id, "ignored")]])
            .build();

        let bundle = provider
            .login("Alice@Example.com", "password123")
            .await
            .expect("login should succeed");

        assert_eq!(bundle.refresh_token.len(), 64);
        let claims = provider
            .verify(&bundle.access_token)
            .await
            .expect("access token should verify");
        assert_eq!(claims.user_id(), Some(id));
        assert_eq!(claims.role, Role::Tenant);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email_alike() {
        let id = Uuid::new_v4();
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([vec![account(id, "password123", true)]])
            .with_query_results([Vec::<user::Model>::new()])
            .build();

        let wrong = provider
            .login("alice@example.com", "nope-nope")
            .await
            .expect_err("wrong password");
        let unknown = provider
            .login("bob@example.com", "password123")
            .await
            .expect_err("unknown email");

        assert_eq!(wrong.message(), "Invalid email or password");
        assert_eq!(unknown.message(), wrong.message());
    }

    #[tokio::test]
    async fn inactive_user_cannot_login() {
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([[account(Uuid::new_v4(), "password123", false)]])
            .build();

        let err = provider
            .login("alice@example.com", "password123")
            .await
            .expect_err("inactive");
        assert_eq!(err.message(), "User account is inactive");
    }

    #[tokio::test]
    async fn refresh_accepts_expired_access_token() {
        let id = Uuid::new_v4();
        let expired = encode_token(
            &keys(),
            &crate::auth::Claims {
                sub: id.to_string(),
                role: Role::Tenant,
                iat: 1,
                exp: 2,
            },
        )
        .expect("encode");
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([[account(id, "password123", true)]])
            .with_query_results([[stored_token(id, "refresh-1")]])
            .with_exec_result(1)
            .with_query_results([[stored_token(id, "ignored")]])
            .build();

        let bundle = provider
            .refresh(&expired, "refresh-1")
            .await
            .expect("refresh should succeed");
        assert_ne!(bundle.refresh_token, "refresh-1");
    }

    #[tokio::test]
    async fn refresh_rejects_unknown_token() {
        let id = Uuid::new_v4();
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([[account(id, "password123", true)]])
            .with_query_results([[stored_token(id, "refresh-1")]])
            .build();

        let err = provider
            .refresh(&access_for(id, 300), "refresh-2")
            .await
            .expect_err("unknown token");
        assert_eq!(err.message(), "Invalid refresh token");
    }

    #[tokio::test]
    async fn refresh_loses_race_when_token_already_revoked() {
        let id = Uuid::new_v4();
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([[account(id, "password123", true)]])
            .with_query_results([[stored_token(id, "refresh-1")]])
            .with_exec_result(0)
            .build();

        let err = provider
            .refresh(&access_for(id, 300), "refresh-1")
            .await
            .expect_err("concurrent refresh won");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn refresh_rejects_inactive_user() {
        let id = Uuid::new_v4();
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([[account(id, "password123", false)]])
            .build();

        let err = provider
            .refresh(&access_for(id, 300), "refresh-1")
            .await
            .expect_err("inactive");
        assert_eq!(err.message(), "User account is inactive");
    }

    #[tokio::test]
    async fn refresh_rejects_foreign_signature() {
        let provider = ProviderFixtureBuilder::new().build();
        let forged = encode_token(
            &JwtKeys::from_secret(b"some-other-secret-some-other-secret"),
            &make_access_claims(&Uuid::new_v4(), Role::SuperAdmin, 300),
        )
        .expect("encode");

        let err = provider
            .refresh(&forged, "refresh-1")
            .await
            .expect_err("bad signature");
        assert!(err.message().starts_with("Invalid or expired token:"));
    }

    #[tokio::test]
    async fn logout_without_match_is_ok() {
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([[stored_token(Uuid::new_v4(), "someone-else")]])
            .build();

        provider
            .logout("not-a-live-token")
            .await
            .expect("logout is idempotent");
    }

    #[tokio::test]
    async fn register_creates_tenant_session() {
        let id = Uuid::new_v4();
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([Vec::<user::Model>::new()])
            .with_query_results([[user_model(id, "new@example.com", Role::Tenant, None)]])
            .with_exec_result(0)
            .with_query_results([[stored_token(id, "ignored")]])
            .build();

        let bundle = provider
            .register("new@example.com", "password123")
            .await
            .expect("register should succeed");
        let claims = provider.verify(&bundle.access_token).await.expect("verify");
        assert_eq!(claims.role, Role::Tenant);
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([[user_model(
                Uuid::new_v4(),
                "new@example.com",
                Role::Tenant,
                None,
            )]])
            .build();

        let err = provider
            .register("new@example.com", "password123")
            .await
            .expect_err("duplicate");
        assert_eq!(err.message(), "User with this email already exists");
    }

    #[tokio::test]
    async fn seed_admin_skips_when_super_admin_exists() {
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([[user_model(
                Uuid::new_v4(),
                "root@example.com",
                Role::SuperAdmin,
                None,
            )]])
            .build();

        provider
            .seed_admin(&test_auth_config())
            .await
            .expect("seed should succeed");
    }

    #[tokio::test]
    async fn seed_admin_creates_super_admin() {
        let provider = ProviderFixtureBuilder::new()
            .with_query_results([Vec::<user::Model>::new(), Vec::new()])
            .with_query_results([[user_model(
                Uuid::new_v4(),
                "admin@example.com",
                Role::SuperAdmin,
                None,
            )]])
            .build();

        provider
            .seed_admin(&test_auth_config())
            .await
            .expect("seed should succeed");
    }
}
