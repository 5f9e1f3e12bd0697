use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use educollab_shared::invite::normalize_email;
use educollab_shared::{EntityId, UserRole, ValidationError};
use educollab_store::{Filter, User};

use crate::commands::non_empty;
use crate::error::{ClientError, Result};
use crate::invalidation::Mutation;
use crate::keys::QueryKey;
use crate::state::Platform;

/// Registration form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub bio: Option<String>,
}

impl Platform {
    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    /// Every registered user, e.g. for picking an invitee.
    pub async fn users(&self) -> Result<Vec<User>> {
        self.cache.fetch_as(&QueryKey::Users).await
    }

    /// Sign in by email lookup. The password is not checked.
    pub async fn login(&self, email: &str, _password: &str) -> Result<User> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ValidationError::EmptyField("email").into());
        }
        let user = self
            .resources
            .find_one::<User>(&Filter::all().eq("email", email.as_str()))
            .await?
            .ok_or_else(|| ClientError::NotFound(format!("no user with email {email}")))?;

        self.session.set(user.clone())?;
        info!(user = %user.id, "signed in");
        Ok(user)
    }

    pub async fn register(&self, form: NewUser) -> Result<User> {
        let name = non_empty("name", &form.name)?;
        let email = normalize_email(&non_empty("email", &form.email)?);

        let taken = self
            .resources
            .find_one::<User>(&Filter::all().eq("email", email.as_str()))
            .await?;
        if taken.is_some() {
            return Err(ClientError::Conflict(format!("{email} is already registered")));
        }

        let user = User {
            id: EntityId::new(),
            email,
            name,
            role: form.role,
            bio: form.bio.filter(|b| !b.trim().is_empty()),
            avatar: None,
            created_at: Some(Utc::now()),
        };
        let user = self.resources.create(&user).await?;
        self.confirm(Mutation::RegisterUser).await;
        self.session.set(user.clone())?;
        info!(user = %user.id, role = %user.role, "registered");
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("signed out");
        Ok(())
    }
}
