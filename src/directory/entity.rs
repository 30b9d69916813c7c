use super::actions::{UserAction, UserActionResult};
use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{incremental_mean, now_millis, Role, User, UserCreate, UserPatch};

impl Entity for User {
    type Id = String;
    type CreatePayload = UserCreate;
    type Patch = UserPatch;
    type Action = UserAction;
    type ActionResult = UserActionResult;

    fn key_of(payload: &UserCreate) -> String {
        payload.id.clone()
    }

    /// Creates a user record from an identity-provider profile.
    ///
    /// New users default to [`Role::Student`]; blank provider names fall back
    /// to a placeholder so the UI always has something to show.
    fn from_create(payload: UserCreate) -> Result<Self, FrameworkError> {
        if payload.id.trim().is_empty() {
            return Err(FrameworkError::Rejected(
                "Identity subject id required".to_string(),
            ));
        }
        let now = now_millis();
        let name = if payload.name.trim().is_empty() {
            "User".to_string()
        } else {
            payload.name
        };
        Ok(Self {
            id: payload.id,
            name,
            role: payload.role.unwrap_or(Role::Student),
            address: None,
            runner_avg_rating: 0.0,
            runner_total_ratings: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Refreshes profile fields. Role and creation time are preserved so a
    /// webhook replay never demotes a runner back to student.
    fn on_update(&mut self, patch: UserPatch) -> Result<(), FrameworkError> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(address) = patch.address {
            self.address = Some(address);
        }
        self.updated_at = now_millis();
        Ok(())
    }

    fn handle_action(&mut self, action: UserAction) -> Result<UserActionResult, FrameworkError> {
        match action {
            UserAction::SetRole(role) => {
                self.role = role;
                self.updated_at = now_millis();
                Ok(UserActionResult::RoleSet)
            }
            UserAction::SetAddress(address) => {
                self.address = Some(address);
                self.updated_at = now_millis();
                Ok(UserActionResult::AddressSet)
            }
            UserAction::RecordRunnerRating(rating) => {
                let (avg, count) = incremental_mean(
                    self.runner_avg_rating,
                    self.runner_total_ratings,
                    rating as f64,
                );
                self.runner_avg_rating = avg;
                self.runner_total_ratings = count;
                Ok(UserActionResult::RatingRecorded { avg, count })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(id: &str, name: &str) -> User {
        User::from_create(UserCreate {
            id: id.into(),
            name: name.into(),
            role: None,
        })
        .unwrap()
    }

    #[test]
    fn new_users_default_to_student_with_placeholder_name() {
        let user = create("user_2abc", "  ");
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.name, "User");
        assert_eq!(user.runner_total_ratings, 0);
    }

    #[test]
    fn blank_subject_id_is_rejected() {
        let result = User::from_create(UserCreate {
            id: "".into(),
            name: "Alice".into(),
            role: None,
        });
        assert!(matches!(result, Err(FrameworkError::Rejected(_))));
    }

    #[test]
    fn profile_patch_preserves_role() {
        let mut user = create("user_2abc", "Alice");
        user.handle_action(UserAction::SetRole(Role::Runner)).unwrap();
        user.on_update(UserPatch {
            name: Some("Alice A.".into()),
            address: None,
        })
        .unwrap();
        assert_eq!(user.name, "Alice A.");
        assert_eq!(user.role, Role::Runner);
    }

    #[test]
    fn runner_rating_uses_incremental_mean() {
        let mut runner = create("user_run", "Bob");
        runner.handle_action(UserAction::RecordRunnerRating(3)).unwrap();
        runner.handle_action(UserAction::RecordRunnerRating(5)).unwrap();
        assert_eq!(runner.runner_total_ratings, 2);
        assert!((runner.runner_avg_rating - 4.0).abs() < 1e-9);

        // 4.0 over two ratings plus a 5 -> 4.333...
        match runner.handle_action(UserAction::RecordRunnerRating(5)).unwrap() {
            UserActionResult::RatingRecorded { avg, count } => {
                assert_eq!(count, 3);
                assert!((avg - 13.0 / 3.0).abs() < 1e-9);
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }
}
