use tracing::info;
use validator::Validate;

use super::api_client::ApiClient;
use crate::context::SessionContext;
use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::error::Result;

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Signs in and returns the context later calls are made under.
    pub async fn login(&self, req: LoginRequest) -> Result<SessionContext> {
        req.validate()?;

        let resp: LoginResponse = self.api.post_json("auth/login", &[], &req).await?;
        let (user, token) = resp.into_parts();
        info!(user_id = %user.id, role = ?user.role, "signed in");
        Ok(SessionContext::signed_in(user, token))
    }
}
