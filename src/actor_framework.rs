//! Generic resource actor: a tokio task owning a keyed store behind an mpsc
//! channel, with a cloneable client handle.
//!
//! The actor's message loop is the serialization point for all state the
//! actor owns: a handler runs to completion before the next request is taken,
//! which is what makes check-then-write sequences on a single record safe
//! without extra locking.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// THE ABSTRACTION
// =============================================================================

/// Trait any domain entity must implement to be managed by [`ResourceActor`].
///
/// Entities here are keyed by externally-issued ids (users carry the identity
/// provider's subject id), so the store key comes out of the create payload
/// rather than a generator.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// The store key carried by a create payload.
    fn key_of(payload: &Self::CreatePayload) -> Self::Id;

    /// Construct the full entity from its payload.
    fn from_create(payload: Self::CreatePayload) -> Result<Self, FrameworkError>;

    /// Apply a partial update in place.
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), FrameworkError>;

    /// Handle a domain-specific action against this entity.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, FrameworkError>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Rejected(String),
    #[error("Actor communication error: {0}")]
    Channel(String),
}

// =============================================================================
// THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T::Id>,
    },
    /// Create when the key is absent, patch when it exists. Used for the
    /// idempotent identity-webhook sync.
    Upsert {
        payload: T::CreatePayload,
        patch: T::Patch,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
        };
        let client = ResourceClient { sender };
        (actor, client)
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let id = T::key_of(&payload);
                    if self.store.contains_key(&id) {
                        let _ = respond_to.send(Err(FrameworkError::AlreadyExists(id.to_string())));
                        continue;
                    }
                    match T::from_create(payload) {
                        Ok(item) => {
                            self.store.insert(id.clone(), item);
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            let _ = respond_to.send(Err(e));
                        }
                    }
                }
                ResourceRequest::Upsert {
                    payload,
                    patch,
                    respond_to,
                } => {
                    let id = T::key_of(&payload);
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item.on_update(patch).map(|_| id),
                        None => T::from_create(payload).map(|item| {
                            self.store.insert(id.clone(), item);
                            id
                        }),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    let items: Vec<T> = self.store.values().cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    if let Some(item) = self.store.get_mut(&id) {
                        if let Err(e) = item.on_update(patch) {
                            let _ = respond_to.send(Err(e));
                            continue;
                        }
                        let _ = respond_to.send(Ok(item.clone()));
                    } else {
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    if self.store.remove(&id).is_some() {
                        let _ = respond_to.send(Ok(()));
                    } else {
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item.handle_action(action);
                        let _ = respond_to.send(result);
                    } else {
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
            }
        }
    }
}

// =============================================================================
// THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    #[cfg(test)]
    pub(crate) fn from_sender(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::Channel("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| FrameworkError::Channel("Actor dropped".to_string()))?
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to })
            .await
    }

    pub async fn upsert(
        &self,
        payload: T::CreatePayload,
        patch: T::Patch,
    ) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Upsert {
            payload,
            patch,
            respond_to,
        })
        .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to })
            .await
    }
}

// =============================================================================
// EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Locker {
        code: String,
        label: String,
        open_count: u32,
    }

    #[derive(Debug)]
    struct LockerCreate {
        code: String,
        label: String,
    }

    #[derive(Debug)]
    struct LockerPatch {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum LockerAction {
        Open,
    }

    impl Entity for Locker {
        type Id = String;
        type CreatePayload = LockerCreate;
        type Patch = LockerPatch;
        type Action = LockerAction;
        type ActionResult = u32;

        fn key_of(payload: &LockerCreate) -> String {
            payload.code.clone()
        }

        fn from_create(payload: LockerCreate) -> Result<Self, FrameworkError> {
            Ok(Self {
                code: payload.code,
                label: payload.label,
                open_count: 0,
            })
        }

        fn on_update(&mut self, patch: LockerPatch) -> Result<(), FrameworkError> {
            if let Some(label) = patch.label {
                self.label = label;
            }
            Ok(())
        }

        fn handle_action(&mut self, action: LockerAction) -> Result<u32, FrameworkError> {
            match action {
                LockerAction::Open => {
                    self.open_count += 1;
                    Ok(self.open_count)
                }
            }
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_keys() {
        let (actor, client) = ResourceActor::<Locker>::new(8);
        tokio::spawn(actor.run());

        let payload = LockerCreate {
            code: "A1".into(),
            label: "north".into(),
        };
        assert_eq!(client.create(payload).await.unwrap(), "A1");

        let dup = LockerCreate {
            code: "A1".into(),
            label: "south".into(),
        };
        assert_eq!(
            client.create(dup).await,
            Err(FrameworkError::AlreadyExists("A1".into()))
        );
    }

    #[tokio::test]
    async fn upsert_creates_then_patches() {
        let (actor, client) = ResourceActor::<Locker>::new(8);
        tokio::spawn(actor.run());

        let payload = LockerCreate {
            code: "B2".into(),
            label: "old".into(),
        };
        client
            .upsert(payload, LockerPatch { label: None })
            .await
            .unwrap();

        let payload = LockerCreate {
            code: "B2".into(),
            label: "ignored".into(),
        };
        client
            .upsert(
                payload,
                LockerPatch {
                    label: Some("new".into()),
                },
            )
            .await
            .unwrap();

        let locker = client.get("B2".into()).await.unwrap().unwrap();
        assert_eq!(locker.label, "new");
        assert_eq!(client.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_patches_existing_and_rejects_missing_keys() {
        let (actor, client) = ResourceActor::<Locker>::new(8);
        tokio::spawn(actor.run());

        let payload = LockerCreate {
            code: "A1".into(),
            label: "north".into(),
        };
        client.create(payload).await.unwrap();

        let locker = client
            .update(
                "A1".into(),
                LockerPatch {
                    label: Some("west".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(locker.label, "west");

        assert_eq!(
            client.update("Z9".into(), LockerPatch { label: None }).await,
            Err(FrameworkError::NotFound("Z9".into()))
        );
    }

    #[tokio::test]
    async fn actions_mutate_through_the_entity() {
        let (actor, client) = ResourceActor::<Locker>::new(8);
        tokio::spawn(actor.run());

        let payload = LockerCreate {
            code: "C3".into(),
            label: "gym".into(),
        };
        client.create(payload).await.unwrap();

        assert_eq!(
            client.perform_action("C3".into(), LockerAction::Open).await,
            Ok(1)
        );
        assert_eq!(
            client.perform_action("C3".into(), LockerAction::Open).await,
            Ok(2)
        );
        assert_eq!(
            client.perform_action("D4".into(), LockerAction::Open).await,
            Err(FrameworkError::NotFound("D4".into()))
        );
    }
}
