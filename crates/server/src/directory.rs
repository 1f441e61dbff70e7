use std::collections::HashMap;

use chrono::Utc;
use shared::{
    domain::{
        demo_user, Credentials, ProfilePatch, RegistrationDraft, UserId, UserProfile,
        DEFAULT_AVATAR, DEMO_PASSWORD,
    },
    error::{ApiException, ErrorCode},
    validation::{validate_email, validate_registration, validate_username, ValidationError},
};
use uuid::Uuid;

use crate::password::{hash_password, verify_password};

struct Account {
    profile: UserProfile,
    password_hash: String,
}

/// In-memory account store backing the mock endpoint.
pub struct Directory {
    accounts: HashMap<UserId, Account>,
    by_email: HashMap<String, UserId>,
    /// Revoked token ids with their expiry; entries drop out once expired.
    revoked: HashMap<Uuid, i64>,
    last_id: i64,
}

impl Directory {
    pub fn empty() -> Self {
        Self {
            accounts: HashMap::new(),
            by_email: HashMap::new(),
            revoked: HashMap::new(),
            last_id: 0,
        }
    }

    /// Directory holding only the demo learner account.
    pub fn seeded() -> Result<Self, ApiException> {
        let mut directory = Self::empty();
        let profile = demo_user();
        directory.last_id = profile.id.0;
        directory.insert(profile, hash(DEMO_PASSWORD)?);
        Ok(directory)
    }

    fn insert(&mut self, profile: UserProfile, password_hash: String) {
        self.by_email.insert(profile.email.clone(), profile.id);
        self.accounts.insert(
            profile.id,
            Account {
                profile,
                password_hash,
            },
        );
    }

    fn next_user_id(&mut self) -> UserId {
        self.last_id = Utc::now().timestamp_millis().max(self.last_id + 1);
        UserId(self.last_id)
    }

    pub fn authenticate(&self, credentials: &Credentials) -> Result<UserProfile, ApiException> {
        let rejected =
            || ApiException::new(ErrorCode::InvalidCredentials, "invalid email or password");
        let id = self.by_email.get(&credentials.email).ok_or_else(rejected)?;
        let account = self.accounts.get(id).ok_or_else(rejected)?;
        let matches = verify_password(&credentials.password, &account.password_hash)
            .map_err(|e| ApiException::new(ErrorCode::Internal, e.to_string()))?;
        if !matches {
            return Err(rejected());
        }
        Ok(account.profile.clone())
    }

    /// No uniqueness check: a repeated email takes over the login index.
    pub fn register(&mut self, draft: &RegistrationDraft) -> Result<UserProfile, ApiException> {
        validate_registration(draft).map_err(validation_failure)?;
        let password_hash = hash(&draft.password)?;

        let profile = UserProfile {
            id: self.next_user_id(),
            email: draft.email.clone(),
            username: draft.username.clone(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            avatar: Some(DEFAULT_AVATAR.to_string()),
        };
        self.insert(profile.clone(), password_hash);
        Ok(profile)
    }

    pub fn profile(&self, id: UserId) -> Option<&UserProfile> {
        self.accounts.get(&id).map(|account| &account.profile)
    }

    pub fn update_profile(
        &mut self,
        id: UserId,
        patch: &ProfilePatch,
    ) -> Result<UserProfile, ApiException> {
        if patch.is_empty() {
            return Err(ApiException::new(
                ErrorCode::Validation,
                "profile update has no fields",
            ));
        }
        if patch.email.as_deref().is_some_and(|email| !validate_email(email)) {
            return Err(validation_failure(ValidationError::InvalidEmail));
        }
        if patch
            .username
            .as_deref()
            .is_some_and(|username| !validate_username(username))
        {
            return Err(validation_failure(ValidationError::InvalidUsername));
        }

        let account = self.accounts.get_mut(&id).ok_or_else(|| {
            ApiException::new(ErrorCode::NoActiveSession, "account no longer exists")
        })?;
        let previous_email = account.profile.email.clone();
        patch.apply_to(&mut account.profile);
        let profile = account.profile.clone();

        if profile.email != previous_email {
            if self.by_email.get(&previous_email) == Some(&id) {
                self.by_email.remove(&previous_email);
            }
            self.by_email.insert(profile.email.clone(), id);
        }
        Ok(profile)
    }

    /// Records `jti` as revoked until `exp`, dropping entries that have
    /// already expired. Returns false if it was already revoked.
    pub fn revoke(&mut self, jti: Uuid, exp: i64) -> bool {
        let now = Utc::now().timestamp();
        self.revoked.retain(|_, expires| *expires > now);
        self.revoked.insert(jti, exp).is_none()
    }

    pub fn is_revoked(&self, jti: &Uuid) -> bool {
        self.revoked.contains_key(jti)
    }
}

fn hash(password: &str) -> Result<String, ApiException> {
    hash_password(password).map_err(|e| ApiException::new(ErrorCode::Internal, e.to_string()))
}

fn validation_failure(err: ValidationError) -> ApiException {
    ApiException::new(ErrorCode::Validation, err.to_string())
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
