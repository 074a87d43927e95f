use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Id, Role, User};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: Id,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub profile_picture: Option<String>,
    pub token: String,
}

impl LoginResponse {
    pub fn into_parts(self) -> (User, String) {
        let user = User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            profile_picture: self.profile_picture,
        };
        (user, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_email() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_empty_password() {
        let req = LoginRequest {
            email: "sara@uca.ma".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
