use std::sync::Arc;

use shared::{
    domain::{AuthToken, Credentials, ProfilePatch, RegistrationDraft, UserProfile},
    protocol::OperationOutcome,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    backend::{AuthBackend, AuthGrant},
    error::AuthError,
    session::Session,
    simulated::SimulatedAuthBackend,
};

/// Owns the client [`Session`] and mediates every change to it.
///
/// Each async operation flips `loading` on, suspends once on the backend, then
/// applies the result. An operation started while another is in flight is
/// rejected with [`AuthError::OperationInProgress`] and leaves state untouched.
/// Dropping an operation's future mid-flight clears `loading` again.
pub struct SessionController {
    backend: Arc<dyn AuthBackend>,
    state: watch::Sender<Session>,
}

/// Marks one operation as in flight. Finishing it applies the result; dropping
/// it unfinished only clears `loading`.
struct InFlight<'a> {
    state: &'a watch::Sender<Session>,
    armed: bool,
}

impl InFlight<'_> {
    fn finish(mut self, apply: impl FnOnce(&mut Session)) {
        self.armed = false;
        self.state.send_modify(|session| {
            session.loading = false;
            apply(session);
        });
    }

    fn fail(self, err: &AuthError) {
        let message = err.to_string();
        self.finish(|session| session.last_error = Some(message));
    }

    fn settle(self) {
        self.finish(|_| {});
    }

    fn establish(self, grant: &AuthGrant) {
        self.finish(|session| {
            session.user = Some(grant.user.clone());
            session.token = Some(grant.token.clone());
            session.last_error = None;
        });
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("operation dropped before completion");
            self.state
                .send_if_modified(|session| std::mem::replace(&mut session.loading, false));
        }
    }
}

impl SessionController {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { backend, state }
    }

    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedAuthBackend::default()))
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Runs `prepare` against the current session and, if it passes and nothing
    /// else is in flight, marks the session as loading in the same step.
    fn begin<T>(
        &self,
        clear_error: bool,
        prepare: impl FnOnce(&Session) -> Result<T, AuthError>,
    ) -> Result<(T, InFlight<'_>), AuthError> {
        let mut outcome = Err(AuthError::OperationInProgress);
        self.state.send_if_modified(|session| {
            let prepared = match prepare(&*session) {
                Ok(prepared) => prepared,
                Err(err) => {
                    outcome = Err(err);
                    return false;
                }
            };
            if session.loading {
                return false;
            }
            session.loading = true;
            if clear_error {
                session.last_error = None;
            }
            outcome = Ok(prepared);
            true
        });
        outcome.map(|prepared| {
            (
                prepared,
                InFlight {
                    state: &self.state,
                    armed: true,
                },
            )
        })
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AuthError> {
        let ((), flight) = self.begin(true, |_| Ok(()))?;
        debug!(email = %credentials.email, "login started");

        match self.backend.login(credentials).await {
            Ok(grant) => {
                flight.establish(&grant);
                info!(user_id = %grant.user.id, "login succeeded");
                Ok(grant)
            }
            Err(err) => {
                flight.fail(&err);
                warn!(email = %credentials.email, code = ?err.code(), error = %err, "login failed");
                Err(err)
            }
        }
    }

    pub async fn register(&self, draft: &RegistrationDraft) -> Result<AuthGrant, AuthError> {
        let ((), flight) = self.begin(true, |_| Ok(()))?;
        debug!(email = %draft.email, username = %draft.username, "registration started");

        match self.backend.register(draft).await {
            Ok(grant) => {
                flight.establish(&grant);
                info!(user_id = %grant.user.id, "registration succeeded");
                Ok(grant)
            }
            Err(err) => {
                flight.fail(&err);
                warn!(email = %draft.email, code = ?err.code(), error = %err, "registration failed");
                Err(err)
            }
        }
    }

    /// Always ends logged out. A backend failure is still reported, and kept as
    /// the session's last error.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let (token, flight) = self.begin(false, |session| Ok(session.token.clone()))?;

        let result = match &token {
            Some(token) => self.backend.logout(token).await,
            None => Ok(()),
        };

        flight.finish(|session| {
            *session = Session::default();
            if let Err(err) = &result {
                session.last_error = Some(err.to_string());
            }
        });

        match &result {
            Ok(()) => info!("logged out"),
            Err(err) => warn!(code = ?err.code(), error = %err, "logout reported an error; local session cleared"),
        }
        result
    }

    pub async fn update_user(&self, patch: &ProfilePatch) -> Result<UserProfile, AuthError> {
        let (token, flight) = self.begin(true, |session| match (&session.user, &session.token) {
            (Some(_), Some(token)) => Ok(token.clone()),
            _ => Err(AuthError::NoActiveSession),
        })?;

        match self.backend.update_profile(&token, patch).await {
            Ok(user) => {
                flight.finish(|session| {
                    session.user = Some(user.clone());
                    session.last_error = None;
                });
                info!(user_id = %user.id, "profile updated");
                Ok(user)
            }
            Err(err) => {
                flight.fail(&err);
                warn!(code = ?err.code(), error = %err, "profile update failed");
                Err(err)
            }
        }
    }

    pub fn clear_error(&self) {
        self.state
            .send_if_modified(|session| session.last_error.take().is_some());
    }

    /// Tries to resume a session from a token persisted by an earlier run.
    /// An invalid or unreachable token leaves the session logged out without
    /// recording an error.
    pub async fn check_auth(
        &self,
        persisted: Option<AuthToken>,
    ) -> Result<Option<AuthGrant>, AuthError> {
        let ((), flight) = self.begin(false, |_| Ok(()))?;

        let Some(token) = persisted else {
            flight.settle();
            return Ok(None);
        };

        match self.backend.restore(&token).await {
            Ok(Some(user)) => {
                let grant = AuthGrant { user, token };
                flight.establish(&grant);
                info!(user_id = %grant.user.id, "session restored");
                Ok(Some(grant))
            }
            Ok(None) => {
                flight.settle();
                debug!("persisted token is no longer valid");
                Ok(None)
            }
            Err(err) => {
                flight.settle();
                warn!(code = ?err.code(), error = %err, "session restore failed");
                Err(err)
            }
        }
    }
}

/// Flattens an operation result into the `{success, error?, ...}` record UI
/// layers consume.
pub trait IntoOutcome {
    fn into_outcome(self) -> OperationOutcome;
}

impl IntoOutcome for Result<AuthGrant, AuthError> {
    fn into_outcome(self) -> OperationOutcome {
        match self {
            Ok(grant) => OperationOutcome::ok()
                .with_user(grant.user)
                .with_token(grant.token),
            Err(err) => OperationOutcome::failed(err.to_string()),
        }
    }
}

impl IntoOutcome for Result<UserProfile, AuthError> {
    fn into_outcome(self) -> OperationOutcome {
        match self {
            Ok(user) => OperationOutcome::ok().with_user(user),
            Err(err) => OperationOutcome::failed(err.to_string()),
        }
    }
}

impl IntoOutcome for Result<(), AuthError> {
    fn into_outcome(self) -> OperationOutcome {
        match self {
            Ok(()) => OperationOutcome::ok(),
            Err(err) => OperationOutcome::failed(err.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
