//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Instead of spinning up a real actor, [`create_mock_resource`] hands back a
//! client wired to a channel the test controls. The test inspects the
//! requests arriving on that channel with the `expect_*` helpers and answers
//! them by hand, which makes success, failure and ordering deterministic.

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use tokio::sync::{mpsc, oneshot};

pub fn create_mock_resource<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::from_sender(sender), receiver)
}

/// Helper to verify that the next message is a Get request.
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Upsert request.
pub async fn expect_upsert<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::CreatePayload,
    T::Patch,
    oneshot::Sender<Result<T::Id, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Upsert {
            payload,
            patch,
            respond_to,
        }) => Some((payload, patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request.
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::DirectoryClient;
    use crate::directory::{UserAction, UserActionResult, UserError};
    use crate::domain::{Role, User};

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            name: "Test".to_string(),
            role,
            address: None,
            runner_avg_rating: 0.0,
            runner_total_ratings: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn update_role_re_fetches_the_acting_user_before_dispatching() {
        let (inner, mut rx) = create_mock_resource::<User>(8);
        let client = DirectoryClient::new(inner);

        let task = tokio::spawn(async move {
            client.update_role("admin_1", "user_1", Role::Runner).await
        });

        let (id, responder) = expect_get(&mut rx).await.expect("Expected Get");
        assert_eq!(id, "admin_1");
        responder.send(Ok(Some(user("admin_1", Role::Admin)))).unwrap();

        let (id, action, responder) = expect_action(&mut rx).await.expect("Expected Action");
        assert_eq!(id, "user_1");
        assert!(matches!(action, UserAction::SetRole(Role::Runner)));
        responder.send(Ok(UserActionResult::RoleSet)).unwrap();

        assert_eq!(task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn update_role_stops_at_the_admin_check_for_students() {
        let (inner, mut rx) = create_mock_resource::<User>(8);
        let client = DirectoryClient::new(inner);

        let task = tokio::spawn(async move {
            client.update_role("user_2", "user_1", Role::Admin).await
        });

        let (_, responder) = expect_get(&mut rx).await.expect("Expected Get");
        responder.send(Ok(Some(user("user_2", Role::Student)))).unwrap();

        assert!(matches!(
            task.await.unwrap(),
            Err(UserError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn sync_profile_sends_a_single_upsert() {
        let (inner, mut rx) = create_mock_resource::<User>(8);
        let client = DirectoryClient::new(inner);

        let task =
            tokio::spawn(async move { client.sync_profile("user_9", "Ada L.".to_string()).await });

        let (payload, patch, responder) = expect_upsert(&mut rx).await.expect("Expected Upsert");
        assert_eq!(payload.id, "user_9");
        assert_eq!(payload.role, None);
        assert_eq!(patch.name.as_deref(), Some("Ada L."));
        responder.send(Ok("user_9".to_string())).unwrap();

        assert_eq!(task.await.unwrap(), Ok("user_9".to_string()));
    }
}
