//! User directory: owns user records and each user's single role
//! reference.
//!
//! Role assignment overwrites: a user holds at most one role, so assigning
//! replaces whatever was there and revoking clears it.

use tracing::{debug, info};
use uuid::Uuid;
use warden_core::credential::CredentialHasher;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::user::{CreateUser, NewUser, UpdateUser, User, UserChanges};
use warden_core::normalize;
use warden_core::repository::{ListQuery, Page, Pagination, RoleRepository, UserRepository};

/// User directory service.
pub struct UserDirectory<U: UserRepository, R: RoleRepository, H: CredentialHasher> {
    users: U,
    roles: R,
    hasher: H,
}

impl<U: UserRepository, R: RoleRepository, H: CredentialHasher> UserDirectory<U, R, H> {
    pub fn new(users: U, roles: R, hasher: H) -> Self {
        Self {
            users,
            roles,
            hasher,
        }
    }

    /// Register a user. The secret is trimmed and hashed before storage;
    /// the new user holds no role.
    pub async fn create(&self, input: NewUser) -> WardenResult<User> {
        let email = normalize::email(&input.email)?;
        let secret = normalize::secret(&input.secret)?;
        self.ensure_email_free(&email, None).await?;

        let password_hash = self.hasher.hash(secret)?;
        let user = self
            .users
            .create(CreateUser {
                first_name: normalize::optional(input.first_name),
                last_name: normalize::optional(input.last_name),
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "User created");
        Ok(user)
    }

    /// Apply a partial update. A supplied secret is only re-hashed when it
    /// differs from the stored one.
    pub async fn update(&self, id: Uuid, changes: UserChanges) -> WardenResult<User> {
        let current = self.users.get_by_id(id).await?;

        let email = match changes.email {
            Some(raw) => {
                let email = normalize::email(&raw)?;
                if email != current.email {
                    self.ensure_email_free(&email, Some(id)).await?;
                }
                Some(email)
            }
            None => None,
        };

        let password_hash = match changes.secret {
            Some(raw) => {
                let secret = normalize::secret(&raw)?;
                if self.hasher.verify(secret, &current.password_hash)? {
                    debug!(user_id = %id, "Secret unchanged; keeping stored hash");
                    None
                } else {
                    Some(self.hasher.hash(secret)?)
                }
            }
            None => None,
        };
        let secret_changed = password_hash.is_some();

        let user = self
            .users
            .update(
                id,
                UpdateUser {
                    first_name: normalize::optional(changes.first_name),
                    last_name: normalize::optional(changes.last_name),
                    email,
                    password_hash,
                },
            )
            .await?;

        info!(user_id = %id, secret_changed, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> WardenResult<()> {
        self.users.delete(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> WardenResult<User> {
        debug!(user_id = %id, "Fetching user");
        self.users.get_by_id(id).await
    }

    pub async fn get_by_email(&self, email: &str) -> WardenResult<User> {
        self.users.get_by_email(&normalize::email(email)?).await
    }

    /// Oldest first.
    pub async fn list(&self, pagination: Pagination) -> WardenResult<Page<User>> {
        self.users.list(ListQuery::all(pagination)).await
    }

    /// Case-insensitive substring match on first name, last name or email,
    /// newest first.
    pub async fn search(&self, term: &str, pagination: Pagination) -> WardenResult<Page<User>> {
        self.users.list(ListQuery::search(term, pagination)).await
    }

    /// Give the user `role_id`, replacing any role they held.
    pub async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> WardenResult<User> {
        let user = self.users.get_by_id(user_id).await?;
        self.roles.get_by_id(role_id).await?;

        let updated = self.users.set_role(user_id, Some(role_id)).await?;

        info!(
            %user_id,
            %role_id,
            previous_role_id = ?user.role_id,
            "Role assigned to user"
        );
        Ok(updated)
    }

    /// Clear the user's role. Succeeds when the user holds none.
    pub async fn revoke_role(&self, user_id: Uuid) -> WardenResult<User> {
        let user = self.users.set_role(user_id, None).await?;
        info!(%user_id, "Role revoked from user");
        Ok(user)
    }

    /// Check a plaintext secret against the user's stored hash.
    pub async fn verify_credential(&self, user_id: Uuid, secret: &str) -> WardenResult<bool> {
        let user = self.users.get_by_id(user_id).await?;
        let secret = normalize::secret(secret)?;
        self.hasher.verify(secret, &user.password_hash)
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> WardenResult<()> {
        match self.users.get_by_email(email).await {
            Ok(existing) if Some(existing.id) == owner => Ok(()),
            Ok(_) => Err(WardenError::DuplicateEmail {
                email: email.into(),
            }),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}
