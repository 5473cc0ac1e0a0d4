//! Account service: registration, login and token refresh
//!
//! Password hashing and verification run on the blocking thread pool.

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::UserRepository;
use fitcoach_shared::types::{AuthTokens, RegisterRequest, UserAccount};
use fitcoach_shared::validation::{validate_display_name, validate_email, validate_password};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

pub struct UserService;

impl UserService {
    pub async fn register(
        pool: &PgPool,
        jwt_service: &JwtService,
        req: RegisterRequest,
    ) -> Result<AuthTokens, ApiError> {
        let email = req.email.trim().to_lowercase();
        validate_email(&email).map_err(ApiError::Validation)?;
        validate_password(&req.password).map_err(ApiError::Validation)?;

        let display_name = req
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if let Some(name) = display_name {
            validate_display_name(name).map_err(ApiError::Validation)?;
        }

        if UserRepository::email_exists(pool, &email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = PasswordService::hash_async(req.password)
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(pool, &email, &password_hash, display_name)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = %user.id, "User registered");
        jwt_service.issue_pair(user.id).map_err(ApiError::Internal)
    }

    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, ApiError> {
        let user = UserRepository::find_by_email(pool, &email.trim().to_lowercase())
            .await
            .map_err(ApiError::Internal)?;

        let valid = PasswordService::verify_async(
            password.to_string(),
            user.as_ref().map(|u| u.password_hash.clone()),
        )
        .await
        .map_err(ApiError::Internal)?;

        match user {
            Some(user) if valid => jwt_service.issue_pair(user.id).map_err(ApiError::Internal),
            _ => Err(ApiError::Unauthorized("Invalid credentials".to_string())),
        }
    }

    pub async fn refresh_token(
        pool: &PgPool,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service
            .validate_refresh_token(refresh_token)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

        UserRepository::find_by_id(pool, claims.sub)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        jwt_service.issue_pair(claims.sub).map_err(ApiError::Internal)
    }

    pub async fn get_account(pool: &PgPool, user_id: Uuid) -> Result<UserAccount, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(UserAccount {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            created_at: user.created_at,
        })
    }
}
