use crate::actor_framework::ResourceClient;
use crate::directory::{UserAction, UserActionResult, UserError};
use crate::domain::{Role, User, UserCreate, UserPatch};
use tracing::{debug, instrument, warn};

/// Client for the user directory actor.
///
/// Carries the admin checks for the operations only admins may perform; the
/// acting user is re-fetched on every call rather than trusted.
#[derive(Clone)]
pub struct DirectoryClient {
    inner: ResourceClient<User>,
}

impl DirectoryClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        debug!("Sending request");
        Ok(self.inner.get(id.to_string()).await?)
    }

    /// Direct registration path for seeding and operations tooling; everyday
    /// creation flows through the webhook sync or get-or-create.
    #[instrument(fields(user_id = %user.id), skip(self, user))]
    pub async fn register(&self, user: UserCreate) -> Result<String, UserError> {
        debug!("Sending request");
        Ok(self.inner.create(user).await?)
    }

    /// Idempotent identity-webhook sync: creates the user with the default
    /// role on first sight, refreshes the profile name afterwards.
    #[instrument(fields(user_id = %id), skip(self, name))]
    pub async fn sync_profile(&self, id: &str, name: String) -> Result<String, UserError> {
        debug!("Sending request");
        let payload = UserCreate {
            id: id.to_string(),
            name: name.clone(),
            role: None,
        };
        let patch = UserPatch {
            name: Some(name),
            address: None,
        };
        Ok(self.inner.upsert(payload, patch).await?)
    }

    /// Get-or-create for first authenticated access ahead of the webhook.
    #[instrument(fields(user_id = %id), skip(self))]
    pub async fn get_or_create(&self, id: &str) -> Result<String, UserError> {
        debug!("Sending request");
        let payload = UserCreate {
            id: id.to_string(),
            name: "Unknown".to_string(),
            role: None,
        };
        Ok(self.inner.upsert(payload, UserPatch::default()).await?)
    }

    /// Deletion-webhook sync. A missing record is logged and tolerated so
    /// webhook replays stay idempotent.
    #[instrument(fields(user_id = %id), skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        debug!("Sending request");
        match self.inner.delete(id.to_string()).await {
            Ok(()) => Ok(()),
            Err(crate::actor_framework::FrameworkError::NotFound(_)) => {
                warn!("Can't delete user, no record for this identity");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(fields(acting = %acting, target = %target, role = ?role), skip(self))]
    pub async fn update_role(
        &self,
        acting: &str,
        target: &str,
        role: Role,
    ) -> Result<(), UserError> {
        debug!("Sending request");
        self.require_admin(acting, "Only admins can update roles")
            .await?;
        self.inner
            .perform_action(target.to_string(), UserAction::SetRole(role))
            .await?;
        Ok(())
    }

    #[instrument(fields(acting = %acting), skip(self, address))]
    pub async fn update_address(&self, acting: &str, address: String) -> Result<(), UserError> {
        debug!("Sending request");
        self.inner
            .perform_action(acting.to_string(), UserAction::SetAddress(address))
            .await?;
        Ok(())
    }

    #[instrument(fields(acting = %acting), skip(self))]
    pub async fn list_users(&self, acting: &str) -> Result<Vec<User>, UserError> {
        debug!("Sending request");
        self.require_admin(acting, "Only admins can view all users")
            .await?;
        Ok(self.inner.list().await?)
    }

    /// Folds one delivery rating into the runner's aggregate and returns the
    /// updated (average, count).
    #[instrument(fields(runner_id = %runner_id, rating = rating), skip(self))]
    pub async fn record_runner_rating(
        &self,
        runner_id: &str,
        rating: u8,
    ) -> Result<(f64, u32), UserError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(runner_id.to_string(), UserAction::RecordRunnerRating(rating))
            .await?
        {
            UserActionResult::RatingRecorded { avg, count } => Ok((avg, count)),
            _ => Err(UserError::ActorCommunicationError(
                "Unexpected result".to_string(),
            )),
        }
    }

    async fn require_admin(&self, acting: &str, denial: &str) -> Result<(), UserError> {
        let user = self
            .get_user(acting)
            .await?
            .ok_or_else(|| UserError::NotFound(acting.to_string()))?;
        if user.role != Role::Admin {
            return Err(UserError::Unauthorized(denial.to_string()));
        }
        Ok(())
    }
}
