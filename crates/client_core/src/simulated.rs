use std::{
    collections::HashMap,
    sync::atomic::{AtomicI64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use shared::domain::{
    demo_user, AuthToken, Credentials, ProfilePatch, RegistrationDraft, UserId, UserProfile,
    DEFAULT_AVATAR, DEMO_EMAIL, DEMO_PASSWORD,
};
use tokio::{sync::Mutex, time::sleep};
use tracing::debug;

use crate::{
    backend::{AuthBackend, AuthGrant},
    error::AuthError,
};

const MOCK_TOKEN_PREFIX: &str = "mock-jwt-token-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedDelays {
    pub login: Duration,
    pub register: Duration,
    pub logout: Duration,
    pub update: Duration,
    pub restore: Duration,
}

impl Default for SimulatedDelays {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(1000),
            register: Duration::from_millis(1500),
            logout: Duration::from_millis(500),
            update: Duration::from_millis(800),
            restore: Duration::from_millis(500),
        }
    }
}

/// In-process stand-in for the auth endpoint. Every call sleeps for a fixed
/// delay before answering; exactly one credential pair is accepted.
pub struct SimulatedAuthBackend {
    delays: SimulatedDelays,
    issued: Mutex<HashMap<AuthToken, UserProfile>>,
    last_stamp: AtomicI64,
}

impl Default for SimulatedAuthBackend {
    fn default() -> Self {
        Self::new(SimulatedDelays::default())
    }
}

impl SimulatedAuthBackend {
    pub fn new(delays: SimulatedDelays) -> Self {
        Self {
            delays,
            issued: Mutex::new(HashMap::new()),
            last_stamp: AtomicI64::new(0),
        }
    }

    pub fn delays(&self) -> SimulatedDelays {
        self.delays
    }

    /// Current unix millis, bumped so two calls never share a stamp.
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self.last_stamp.compare_exchange_weak(
                prev,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    async fn issue(&self, user: UserProfile) -> AuthGrant {
        let token = AuthToken::new(format!("{MOCK_TOKEN_PREFIX}{}", self.next_stamp()));
        self.issued.lock().await.insert(token.clone(), user.clone());
        AuthGrant { user, token }
    }
}

#[async_trait]
impl AuthBackend for SimulatedAuthBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError> {
        sleep(self.delays.login).await;
        if credentials.email != DEMO_EMAIL || credentials.password != DEMO_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.issue(demo_user()).await)
    }

    async fn register(&self, draft: &RegistrationDraft) -> Result<AuthGrant, AuthError> {
        sleep(self.delays.register).await;
        let user = UserProfile {
            id: UserId(self.next_stamp()),
            email: draft.email.clone(),
            username: draft.username.clone(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            avatar: Some(DEFAULT_AVATAR.to_string()),
        };
        debug!(user_id = %user.id, "simulated registration");
        Ok(self.issue(user).await)
    }

    async fn logout(&self, token: &AuthToken) -> Result<(), AuthError> {
        sleep(self.delays.logout).await;
        self.issued.lock().await.remove(token);
        Ok(())
    }

    async fn update_profile(
        &self,
        token: &AuthToken,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, AuthError> {
        sleep(self.delays.update).await;
        let mut issued = self.issued.lock().await;
        let profile = issued.get_mut(token).ok_or(AuthError::NoActiveSession)?;
        patch.apply_to(profile);
        Ok(profile.clone())
    }

    async fn restore(&self, token: &AuthToken) -> Result<Option<UserProfile>, AuthError> {
        sleep(self.delays.restore).await;
        Ok(self.issued.lock().await.get(token).cloned())
    }
}

#[cfg(test)]
#[path = "tests/simulated_tests.rs"]
mod tests;
