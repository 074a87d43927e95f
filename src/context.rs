use crate::models::{User, UserId};

/// Signed-in identity handed to services and sessions explicitly.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Option<User>,
    token: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn current_user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Dashboard route for the signed-in role, or the login page.
    pub fn landing_path(&self) -> &'static str {
        match &self.user {
            Some(user) => user.role.landing_path(),
            None => "/login",
        }
    }

    pub fn sign_out(&mut self) {
        self.user = None;
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Id, Role};

    fn professor() -> User {
        User {
            id: Id::from(4),
            email: "prof@uca.ma".to_string(),
            first_name: "Amal".to_string(),
            last_name: "Idrissi".to_string(),
            role: Role::Professor,
            profile_picture: None,
        }
    }

    #[test]
    fn sign_out_clears_identity() {
        let mut ctx = SessionContext::signed_in(professor(), "jwt");
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.current_user_id(), Some(&Id::from(4)));
        assert_eq!(ctx.landing_path(), "/professor/dashboard");

        ctx.sign_out();
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.current_user_id(), None);
        assert_eq!(ctx.landing_path(), "/login");
    }
}
