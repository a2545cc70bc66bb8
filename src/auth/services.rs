use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::PasswordHasher,
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::AppError,
    state::AppState,
};

/// Registration, login and identity lookup.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.users.clone(),
            state.hasher.clone(),
            JwtKeys::from_ref(state),
        )
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, keys: JwtKeys) -> Self {
        Self {
            users,
            hasher,
            keys,
        }
    }

    /// Expects a request that already went through `RegisterRequest::normalized`.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        if self.users.find_by_email(&req.email).await?.is_some() {
            warn!("email already registered");
            return Err(AppError::EmailInUse);
        }

        let password_hash = self.hasher.hash(req.password).await?;
        let user = self
            .users
            .create(NewUser {
                name: req.name,
                email: req.email,
                password_hash,
            })
            .await?
            // Lost a race with a concurrent registration.
            .ok_or(AppError::EmailInUse)?;

        info!(user_id = %user.id, "user registered");
        self.respond(user)
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let Some(user) = self.users.find_by_email(&req.email).await? else {
            self.hasher.verify_dummy(req.password).await?;
            warn!("login unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let ok = self
            .hasher
            .verify(req.password, user.password_hash.clone())
            .await?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        self.respond(user)
    }

    #[instrument(skip(self))]
    pub async fn current_user(&self, user_id: Uuid) -> Result<PublicUser, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(PublicUser::from)
            .ok_or(AppError::Unauthorized("User not found"))
    }

    fn respond(&self, user: User) -> Result<AuthResponse, AppError> {
        let token = self.keys.sign(&user)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }
}
