use crate::domain::Role;

/// Custom actions for user records beyond standard CRUD.
#[derive(Debug, Clone)]
pub enum UserAction {
    /// Replace the user's role. Authorization (admin only) is checked by the
    /// caller before the action is dispatched.
    SetRole(Role),
    /// Replace the user's delivery address.
    SetAddress(String),
    /// Fold one delivery rating into the runner aggregate.
    RecordRunnerRating(u8),
}

/// Results from UserActions - variants match 1:1 with UserAction.
#[derive(Debug, Clone)]
pub enum UserActionResult {
    RoleSet,
    AddressSet,
    /// The updated aggregate after recording a rating.
    RatingRecorded { avg: f64, count: u32 },
}
