//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations must enforce
//! uniqueness of `permission.name`, `role.name` and `user.email` at the
//! storage boundary and report violations as typed duplicate errors.

use serde::Serialize;
use uuid::Uuid;

use crate::error::{WardenError, WardenResult};
use crate::models::{
    permission::{CreatePermission, Permission, UpdatePermission},
    role::{CreateRole, Role, UpdateRole},
    user::{CreateUser, UpdateUser, User},
};

/// Upper bound on `page_size` accepted by [`Pagination::new`].
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page-number pagination. `page` is 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    pub fn new(page: u64, page_size: u64) -> WardenResult<Self> {
        if page == 0 {
            return Err(WardenError::validation("page must be at least 1"));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(WardenError::validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }

    /// Number of records to skip before this page starts.
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)).saturating_mul(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 5,
        }
    }
}

/// A single page of results plus the metadata needed to walk the rest.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn empty(pagination: Pagination) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: pagination.page,
            page_size: pagination.page_size,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Listing query: plain pagination, optionally narrowed by a
/// case-insensitive substring search.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Substring to match. Matching is case-insensitive; `None` lists all.
    pub search: Option<String>,
    pub pagination: Pagination,
}

impl ListQuery {
    pub fn all(pagination: Pagination) -> Self {
        Self {
            search: None,
            pagination,
        }
    }

    pub fn search(term: impl Into<String>, pagination: Pagination) -> Self {
        Self {
            search: Some(term.into()),
            pagination,
        }
    }

    /// The search term lower-cased and trimmed, or `None` when the query
    /// does not narrow the listing.
    pub fn normalized_search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

// ---------------------------------------------------------------------------
// Permission catalog
// ---------------------------------------------------------------------------

pub trait PermissionRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = WardenResult<Permission>> + Send;
    /// Fetch every permission whose id is in `ids`. Unknown ids are skipped.
    fn get_many(&self, ids: &[Uuid]) -> impl Future<Output = WardenResult<Vec<Permission>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePermission,
    ) -> impl Future<Output = WardenResult<Permission>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
    /// Listing is ordered by creation time, newest first.
    fn list(&self, query: ListQuery)
    -> impl Future<Output = WardenResult<Page<Permission>>> + Send;
}

// ---------------------------------------------------------------------------
// Role registry
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = WardenResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<Role>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = WardenResult<Role>> + Send;
    /// Replace the role's name and permission set.
    fn update(&self, id: Uuid, input: UpdateRole)
    -> impl Future<Output = WardenResult<Role>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
    /// Unfiltered listings are ordered by name ascending; searches by
    /// creation time, newest first.
    fn list(&self, query: ListQuery) -> impl Future<Output = WardenResult<Page<Role>>> + Send;

    /// Append a permission id unless already present, as one atomic write.
    fn add_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = WardenResult<Role>> + Send;

    /// Remove a permission id if present, as one atomic write.
    fn remove_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = WardenResult<Role>> + Send;

    /// Strip a permission id from every role holding it. Returns the number
    /// of roles changed.
    fn remove_permission_from_all(
        &self,
        permission_id: Uuid,
    ) -> impl Future<Output = WardenResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// User directory
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = WardenResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = WardenResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = WardenResult<User>> + Send;
    fn update(&self, id: Uuid, input: UpdateUser)
    -> impl Future<Output = WardenResult<User>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;
    /// Unfiltered listings are ordered by creation time, oldest first;
    /// searches by creation time, newest first.
    fn list(&self, query: ListQuery) -> impl Future<Output = WardenResult<Page<User>>> + Send;

    /// Overwrite the user's role reference. `None` clears it.
    fn set_role(
        &self,
        user_id: Uuid,
        role_id: Option<Uuid>,
    ) -> impl Future<Output = WardenResult<User>> + Send;

    /// Clear the role reference of every user holding `role_id`. Returns
    /// the number of users changed.
    fn clear_role_from_all(&self, role_id: Uuid) -> impl Future<Output = WardenResult<u64>> + Send;
}
