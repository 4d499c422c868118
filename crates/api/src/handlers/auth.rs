//! Handlers for the `/auth` resource (register, login, Google sign-in).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use formdeck_core::error::CoreError;
use formdeck_db::models::user::{CreateUser, User};
use formdeck_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::google::{verify_google_id_token, GoogleAuthError};
use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Minimum password length enforced on registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (argon2 input cap shared with the old system).
const MAX_PASSWORD_LENGTH: usize = 72;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/google`.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

/// Successful authentication response returned by all sign-in endpoints.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`] and returned by `/auth/me`.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: String,
    pub is_admin: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar_url: user.avatar_url.clone(),
            provider: user.provider.clone(),
            is_admin: user.is_admin,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a local account. Returns 409 when the email is already taken.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = input.email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email address is required".into(),
        )));
    }

    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    if input.password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
        ))));
    }

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already in use".into(),
        )));
    }

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        email,
        password_hash: Some(hashed),
        full_name: input.full_name,
        avatar_url: None,
        google_sub: None,
        provider: "local".to_string(),
    };
    let user = UserRepo::create(&state.pool, &create_dto).await?;
    tracing::info!(user_id = %user.id, "User registered");

    let response = auth_response(&state, &user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    // Google-only accounts have no password to check.
    let Some(password_hash) = user.password_hash.as_deref() else {
        return Err(invalid_credentials());
    };

    if !user.is_active {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Account is inactive".into(),
        )));
    }

    let password_valid = verify_password(&input.password, password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid_credentials());
    }

    UserRepo::record_login(&state.pool, user.id).await?;

    Ok(Json(auth_response(&state, &user)?))
}

/// POST /api/v1/auth/google
///
/// Sign in with a Google ID token. Creates the account on first sign-in;
/// otherwise links the Google identity to the matching account.
pub async fn google(
    State(state): State<AppState>,
    Json(input): Json<GoogleLoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let claims = verify_google_id_token(&state.config.google_client_id, &input.id_token)
        .await
        .map_err(|err| match err {
            GoogleAuthError::Rejected(msg) => {
                AppError::Core(CoreError::Unauthorized(format!("Invalid Google token: {msg}")))
            }
            GoogleAuthError::Unavailable(msg) => AppError::UpstreamAuth(msg),
        })?;

    let email = claims.email.clone().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Google token has no email claim".into(),
        ))
    })?;

    let existing = UserRepo::find_by_google_sub_or_email(&state.pool, &claims.sub, &email).await?;

    let user = match existing {
        None => {
            let create_dto = CreateUser {
                email,
                password_hash: None,
                full_name: claims.name.clone(),
                avatar_url: claims.picture.clone(),
                google_sub: Some(claims.sub.clone()),
                provider: "google".to_string(),
            };
            let user = UserRepo::create(&state.pool, &create_dto).await?;
            tracing::info!(user_id = %user.id, "User created via Google sign-in");
            user
        }
        Some(user) => {
            if !user.is_active {
                return Err(AppError::Core(CoreError::Unauthorized(
                    "Account is inactive".into(),
                )));
            }
            // A local account gains the Google identity and becomes mixed.
            let provider = if user.provider == "local" {
                "mixed"
            } else {
                user.provider.as_str()
            }
            .to_string();
            UserRepo::link_google(
                &state.pool,
                user.id,
                &claims.sub,
                claims.name.as_deref(),
                claims.picture.as_deref(),
                &provider,
            )
            .await?
        }
    };

    if !user.is_active {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Account is inactive".into(),
        )));
    }

    Ok(Json(auth_response(&state, &user)?))
}

/// GET /api/v1/auth/me
///
/// The authenticated user's profile.
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<UserInfo>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    Ok(Json(UserInfo::from(&user)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

/// Generate an access token and build the response envelope.
fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, AppError> {
    let token = generate_access_token(user.id, user.is_admin, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        token,
        user: UserInfo::from(user),
    })
}
