use std::sync::Arc;

use validator::Validate;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::{LoginRequest, LoginResponse, LoginUser, RegisterRequest, TokenService, TokenUser};
use crate::error::AppError;
use crate::models::{NewUser, PublicUser, User};
use crate::store::{normalize_email, UserStore};

/// Registration and login on top of the document store and the credential helpers.
pub struct UserService {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Creates an account and returns its public fields.
    pub async fn register(&self, input: RegisterRequest) -> Result<PublicUser, AppError> {
        input.validate()?;
        if self.is_user_exists(&input.email).await? {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let password_hash = hash_password_blocking(input.password).await?;
        let user = self
            .store
            .create(NewUser {
                username: input.username.trim().to_string(),
                email: normalize_email(&input.email),
                password_hash,
            })
            .await?;

        log::info!("Registered user {}", user.id);
        Ok(user.public())
    }

    /// Checks the credentials and issues an access token.
    ///
    /// Unknown email and wrong password both come back as `Unauthorized`.
    pub async fn login(&self, input: LoginRequest) -> Result<LoginResponse, AppError> {
        input.validate()?;
        let user = match self.find_user_by_email(&input.email).await? {
            Some(user) => user,
            None => {
                log::warn!("Login attempt for unknown email");
                return Err(AppError::Unauthorized("Email or password is not valid".into()));
            }
        };

        if !self
            .compare_password(input.password, user.password_hash.clone())
            .await?
        {
            log::warn!("Rejected password for user {}", user.id);
            return Err(AppError::Unauthorized("Email or password is not valid".into()));
        }

        let identity = TokenUser {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
        };
        let access_token = self.tokens.issue(&identity)?;
        log::info!("User {} logged in", user.id);

        Ok(LoginResponse {
            user: LoginUser {
                id: identity.id,
                email: identity.email,
                username: identity.username,
                access_token,
            },
        })
    }

    pub async fn is_user_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.find_user_by_email(email).await?.is_some())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.store.find_by_email(email).await
    }

    pub async fn compare_password(
        &self,
        plain_password: String,
        hashed_password: String,
    ) -> Result<bool, AppError> {
        verify_password_blocking(plain_password, hashed_password).await
    }
}
