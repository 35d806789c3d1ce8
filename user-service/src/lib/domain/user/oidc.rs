use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::ExternalIdentity;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::domain::user::ports::ProviderLinkRepository;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::LinkError;
use crate::user::errors::RepositoryError;

/// Maximum attempts for the conflict-prone link sequence: the initial try
/// plus exactly one retry.
const LINK_ATTEMPTS: u32 = 2;

/// Pause before the retry so the racing writer's transaction can commit.
/// The exact value is not load-bearing.
const LINK_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Date-of-birth sentinel for federated accounts, which never supply one.
fn federated_date_of_birth() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid constant date")
}

/// Resolves a verified external identity to a local account, creating the
/// account and provider link on first use.
///
/// No application-level lock protects the create path; two concurrent
/// first-time logins for the same identity race to the storage uniqueness
/// constraints. The loser retries once from the top, where it observes the
/// winner's committed rows.
pub struct OidcLoginService<UR, PR>
where
    UR: UserRepository,
    PR: ProviderLinkRepository,
{
    users: Arc<UR>,
    links: Arc<PR>,
    password_hasher: auth::PasswordHasher,
    retry_delay: Duration,
}

impl<UR, PR> OidcLoginService<UR, PR>
where
    UR: UserRepository,
    PR: ProviderLinkRepository,
{
    pub fn new(users: Arc<UR>, links: Arc<PR>) -> Self {
        Self {
            users,
            links,
            password_hasher: auth::PasswordHasher::new(),
            retry_delay: LINK_RETRY_DELAY,
        }
    }

    /// Resolve an identity to its local account.
    ///
    /// Order: existing provider link, then account claimed by email, then
    /// a fresh account; the provider link is persisted eagerly in all
    /// create paths. A password-registered account is intentionally
    /// claimable by a federated login with the same email.
    ///
    /// # Errors
    /// * `UnverifiedEmail` - Email absent or not verified; rejected before
    ///   any storage access
    /// * `Conflict` - A uniqueness race was lost twice in a row
    /// * `Repository` - Any other storage failure, unmodified
    pub async fn link_or_create(&self, identity: &ExternalIdentity) -> Result<User, LinkError> {
        let email = match &identity.email {
            Some(email) if identity.email_verified => email,
            _ => return Err(LinkError::UnverifiedEmail),
        };
        // The assertion verifier has already vouched for the address; a
        // shape the email type rejects is still a bad assertion.
        let email =
            EmailAddress::new(email.clone()).map_err(|_| LinkError::UnverifiedEmail)?;

        for attempt in 1..=LINK_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(self.retry_delay).await;
            }

            if let Some(user) = self
                .links
                .find_linked_user(&identity.provider, &identity.subject)
                .await?
            {
                return Ok(user);
            }

            let outcome = match self.users.find_by_email(&email).await? {
                Some(user) => self
                    .links
                    .link_existing(user.id, &identity.provider, &identity.subject)
                    .await
                    .map(|_| user),
                None => {
                    let new_user = self.federated_account(identity, &email)?;
                    self.links
                        .create_user_with_link(new_user, &identity.provider, &identity.subject)
                        .await
                }
            };

            match outcome {
                Ok(user) => return Ok(user),
                Err(RepositoryError::UniqueViolation(constraint)) => {
                    tracing::warn!(
                        provider = %identity.provider,
                        subject = %identity.subject,
                        %constraint,
                        attempt,
                        "identity link lost a uniqueness race"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(LinkError::Conflict)
    }

    /// Build the account record for a first-time federated login: display
    /// name as username (email local part when absent or unusable), a
    /// random unusable password run through the hash, sentinel date of
    /// birth, role USER.
    fn federated_account(
        &self,
        identity: &ExternalIdentity,
        email: &EmailAddress,
    ) -> Result<NewUser, LinkError> {
        let display_name = identity.name.clone().unwrap_or_default();
        // The local part of a verified RFC 5322 address always forms a
        // valid username, so the fallback cannot fail.
        let username = Username::new(display_name)
            .or_else(|_| Username::new(email.local_part().to_string()))
            .map_err(|_| LinkError::UnverifiedEmail)?;

        let password_hash = self.password_hasher.hash(&Uuid::new_v4().to_string())?;

        Ok(NewUser {
            username,
            email: email.clone(),
            password_hash,
            date_of_birth: federated_date_of_birth(),
            role: Role::User,
        })
    }
}
