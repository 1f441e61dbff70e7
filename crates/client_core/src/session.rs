use shared::domain::{AuthToken, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    LoggedOut,
    LoggedIn,
}

/// Authentication state of one running client.
///
/// Only [`SessionController`](crate::SessionController) mutates it. The
/// authenticated flag is derived from the user/token pair so the two can never
/// disagree.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub(crate) user: Option<UserProfile>,
    pub(crate) token: Option<AuthToken>,
    pub(crate) loading: bool,
    pub(crate) last_error: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_authenticated() {
            SessionPhase::LoggedIn
        } else {
            SessionPhase::LoggedOut
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
