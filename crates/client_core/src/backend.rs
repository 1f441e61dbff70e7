use async_trait::async_trait;
use shared::{
    domain::{AuthToken, Credentials, ProfilePatch, RegistrationDraft, UserProfile},
    protocol::AuthResponse,
};

use crate::error::AuthError;

/// The `{user, token}` pair produced by a successful login, registration or
/// session restore.
pub type AuthGrant = AuthResponse;

/// Remote side of the session controller.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError>;
    async fn register(&self, draft: &RegistrationDraft) -> Result<AuthGrant, AuthError>;
    async fn logout(&self, token: &AuthToken) -> Result<(), AuthError>;
    async fn update_profile(
        &self,
        token: &AuthToken,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, AuthError>;
    /// Resolves a previously issued token. `Ok(None)` means the token is no
    /// longer valid.
    async fn restore(&self, token: &AuthToken) -> Result<Option<UserProfile>, AuthError>;
}
