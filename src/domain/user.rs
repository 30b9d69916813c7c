/// Access level attached to a user record. The role is the sole
/// authorization gate in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Runner,
    Admin,
}

/// A registered user, keyed by the identity provider's subject id.
///
/// Runner rating aggregates live on the user record itself so the dispatch
/// screens can show them without a join.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub address: Option<String>,
    pub runner_avg_rating: f64,
    pub runner_total_ratings: u32,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Payload for creating a user. `id` is the identity provider subject id.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub id: String,
    pub name: String,
    /// Defaults to [`Role::Student`] when absent; webhook-driven creation
    /// never supplies a role.
    pub role: Option<Role>,
}

/// Payload for patching a user. Role changes go through a dedicated action.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub address: Option<String>,
}
