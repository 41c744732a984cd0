//! User facade: creation with hashed passwords, unique emails, authentication

use crate::core::patch::Patch;
use crate::core::{FieldValue, HbnbError, PasswordHasher, Repository, Result};
use crate::entities::{NewUser, User};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{fetch, validated_update};

/// Fields only the relation manager may change
const MANAGED_FIELDS: &[&str] = &["places"];

#[derive(Clone)]
pub struct UserFacade {
    repo: Arc<dyn Repository<User>>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserFacade {
    pub fn new(repo: Arc<dyn Repository<User>>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repo, hasher }
    }

    pub(crate) fn repository(&self) -> &dyn Repository<User> {
        self.repo.as_ref()
    }

    /// Validate, enforce email uniqueness, hash the password and persist.
    ///
    /// The returned user carries the password hash; use [`User::public`]
    /// before exposing it.
    pub async fn create_user(&self, draft: NewUser) -> Result<User> {
        draft.validate()?;
        self.ensure_email_free(&draft.email, None).await?;

        let hash = self.hasher.hash(&draft.password)?;
        let user = User::new(draft, hash);
        user.check()?;

        let user = self.repo.add(user).await?;
        tracing::debug!(id = %user.id, "user created");
        Ok(user)
    }

    pub async fn get_user(&self, id: &Uuid) -> Result<User> {
        fetch(self.repository(), id).await
    }

    /// The single user registered under `email`
    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let mut users = self
            .repo
            .get_by_attribute("email", &FieldValue::from(email))
            .await?;
        match users.len() {
            0 => Err(HbnbError::not_found("user", email)),
            1 => Ok(users.remove(0)),
            _ => Err(HbnbError::conflict(format!(
                "multiple users share the email '{}'",
                email
            ))),
        }
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        self.repo.get_all().await
    }

    /// Partial update. A new `password` is hashed; a new `email` must be free.
    pub async fn update_user(&self, id: &Uuid, patch: Patch) -> Result<User> {
        let mut patch = patch;

        if let Some(email) = patch.get("email") {
            let email = email
                .as_str()
                .ok_or_else(|| HbnbError::invalid("email", "email must be a string"))?;
            self.ensure_email_free(email, Some(id)).await?;
        }

        if let Some(password) = patch.get("password") {
            let password = password
                .as_str()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| HbnbError::invalid("password", "password must not be empty"))?;
            let hash = self.hasher.hash(password)?;
            patch.insert("password".to_string(), Value::String(hash));
        }

        validated_update(self.repository(), id, &patch, MANAGED_FIELDS, User::check).await
    }

    /// Delete the user record only. Owned places are left untouched.
    pub async fn delete_user(&self, id: &Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::debug!(id = %id, "user deleted");
        Ok(())
    }

    /// Check an email/password pair.
    ///
    /// Unknown emails and wrong passwords both yield `InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = match self.get_user_by_email(email).await {
            Ok(user) => user,
            Err(HbnbError::NotFound { .. }) => return Err(HbnbError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        if self.hasher.verify(password, &user.password)? {
            Ok(user)
        } else {
            tracing::debug!(id = %user.id, "password rejected");
            Err(HbnbError::InvalidCredentials)
        }
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<&Uuid>) -> Result<()> {
        let taken = self
            .repo
            .get_by_attribute("email", &FieldValue::from(email))
            .await?
            .into_iter()
            .any(|user| Some(&user.id) != owner);

        if taken {
            return Err(HbnbError::invalid(
                "email",
                format!("a user with email '{}' already exists", email),
            ));
        }
        Ok(())
    }
}
