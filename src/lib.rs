pub mod chat;
pub mod config;
pub mod context;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

use crate::config::Config;
use crate::context::SessionContext;
use crate::dto::auth_dto::LoginRequest;
use crate::error::Result;
use crate::services::{api_client::ApiClient, auth_service::AuthService, quiz_service::QuizService};

/// Backend services plus the signed-in user they act for.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub auth_service: AuthService,
    pub quiz_service: QuizService,
    pub context: SessionContext,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let api = ApiClient::from_config(config)?;
        Ok(Self::with_client(api, SessionContext::anonymous()))
    }

    fn with_client(api: ApiClient, context: SessionContext) -> Self {
        let auth_service = AuthService::new(api.clone());
        let quiz_service = QuizService::new(api.clone());
        Self {
            api,
            auth_service,
            quiz_service,
            context,
        }
    }

    /// Logs in and rebuilds the services around the issued token.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<&SessionContext> {
        let context = self
            .auth_service
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let mut api = self.api.clone();
        api.set_token(context.token().map(str::to_string));
        *self = Self::with_client(api, context);
        Ok(&self.context)
    }

    pub fn sign_out(&mut self) {
        let mut api = self.api.clone();
        api.set_token(None);
        *self = Self::with_client(api, SessionContext::anonymous());
    }
}
