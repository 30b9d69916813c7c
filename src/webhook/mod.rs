//! Identity-provider webhook: signed user sync events from the auth SaaS.

pub mod error;
pub mod event;
pub mod signature;

pub use error::WebhookError;
pub use event::{parse_event, IdentityEvent, IdentityProfile};
pub use signature::SignatureVerifier;

use crate::clients::DirectoryClient;
use crate::domain::now_millis;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use tracing::{debug, error, info, instrument};

pub const WEBHOOK_PATH: &str = "/clerk-users-webhook";

#[derive(Clone)]
pub struct WebhookState {
    /// Shared signing secret. Absent when the deployment is misconfigured;
    /// the handler then answers 500 so the provider retries later.
    pub secret: Option<String>,
    pub directory: DirectoryClient,
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(identity_webhook))
        .with_state(state)
}

#[instrument(name = "identity_webhook", skip(state, headers, body))]
pub async fn identity_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, WebhookError> {
    let Some(secret) = state.secret.as_deref() else {
        error!("Webhook secret not configured");
        return Err(WebhookError::MissingSecret);
    };

    let (Some(id), Some(timestamp), Some(signature)) = (
        header(&headers, "svix-id"),
        header(&headers, "svix-timestamp"),
        header(&headers, "svix-signature"),
    ) else {
        error!("Missing Svix headers");
        return Err(WebhookError::MissingHeaders);
    };

    let verifier = SignatureVerifier::new(secret)?;
    verifier.verify(id, timestamp, signature, &body, now_millis() / 1000)?;
    debug!("Webhook verified");

    match parse_event(&body)? {
        IdentityEvent::UserCreated(profile) | IdentityEvent::UserUpdated(profile) => {
            info!(subject = %profile.id, "Processing user upsert");
            state
                .directory
                .sync_profile(&profile.id, profile.display_name())
                .await
                .map_err(|e| WebhookError::Directory(e.to_string()))?;
        }
        IdentityEvent::UserDeleted { id } => {
            info!(subject = %id, "Processing user deletion");
            state
                .directory
                .delete_user(&id)
                .await
                .map_err(|e| WebhookError::Directory(e.to_string()))?;
        }
        IdentityEvent::Ignored { kind } => {
            debug!(kind = %kind, "Ignoring event type");
        }
    }

    Ok(StatusCode::OK)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::domain::User;
    use axum::response::IntoResponse;

    const SECRET: &str = "whsec_dG9wLXNlY3JldC1zaWduaW5nLWtleQ==";

    fn state_with_directory(secret: Option<&str>) -> WebhookState {
        let (actor, resource_client) = ResourceActor::<User>::new(16);
        tokio::spawn(actor.run());
        WebhookState {
            secret: secret.map(|s| s.to_string()),
            directory: DirectoryClient::new(resource_client),
        }
    }

    fn signed_headers(body: &str) -> HeaderMap {
        let timestamp = (now_millis() / 1000).to_string();
        let verifier = SignatureVerifier::new(SECRET).unwrap();
        let signature = verifier.sign("msg_1", &timestamp, body);

        let mut headers = HeaderMap::new();
        headers.insert("svix-id", "msg_1".parse().unwrap());
        headers.insert("svix-timestamp", timestamp.parse().unwrap());
        headers.insert("svix-signature", signature.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn verified_create_event_upserts_a_user() {
        let state = state_with_directory(Some(SECRET));
        let body =
            r#"{"type":"user.created","data":{"id":"user_2abc","first_name":"Ada","last_name":"L."}}"#;

        let status = identity_webhook(State(state.clone()), signed_headers(body), body.to_string())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);

        let user = state.directory.get_user("user_2abc").await.unwrap().unwrap();
        assert_eq!(user.name, "Ada L.");
    }

    #[tokio::test]
    async fn update_event_refreshes_name_but_not_role() {
        let state = state_with_directory(Some(SECRET));
        let created =
            r#"{"type":"user.created","data":{"id":"user_2abc","first_name":"Ada","last_name":null}}"#;
        identity_webhook(
            State(state.clone()),
            signed_headers(created),
            created.to_string(),
        )
        .await
        .unwrap();

        // Promote out of band, then replay an update.
        let admin = crate::domain::UserCreate {
            id: "admin_1".into(),
            name: "Root".into(),
            role: Some(crate::domain::Role::Admin),
        };
        state.directory.register(admin).await.unwrap();
        state
            .directory
            .update_role("admin_1", "user_2abc", crate::domain::Role::Runner)
            .await
            .unwrap();

        let updated =
            r#"{"type":"user.updated","data":{"id":"user_2abc","first_name":"Grace","last_name":null}}"#;
        identity_webhook(
            State(state.clone()),
            signed_headers(updated),
            updated.to_string(),
        )
        .await
        .unwrap();

        let user = state.directory.get_user("user_2abc").await.unwrap().unwrap();
        assert_eq!(user.name, "Grace");
        assert_eq!(user.role, crate::domain::Role::Runner);
    }

    #[tokio::test]
    async fn delete_event_removes_the_user_and_tolerates_replays() {
        let state = state_with_directory(Some(SECRET));
        let created = r#"{"type":"user.created","data":{"id":"user_2abc"}}"#;
        identity_webhook(
            State(state.clone()),
            signed_headers(created),
            created.to_string(),
        )
        .await
        .unwrap();

        let deleted = r#"{"type":"user.deleted","data":{"id":"user_2abc"}}"#;
        for _ in 0..2 {
            let status = identity_webhook(
                State(state.clone()),
                signed_headers(deleted),
                deleted.to_string(),
            )
            .await
            .unwrap();
            assert_eq!(status, StatusCode::OK);
        }
        assert!(state.directory.get_user("user_2abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_event_types_are_acknowledged_without_changes() {
        let state = state_with_directory(Some(SECRET));
        let body = r#"{"type":"session.created","data":{"id":"sess_1"}}"#;

        let status = identity_webhook(State(state.clone()), signed_headers(body), body.to_string())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(state.directory.get_user("sess_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tampered_body_is_rejected_with_400() {
        let state = state_with_directory(Some(SECRET));
        let body = r#"{"type":"user.created","data":{"id":"user_2abc"}}"#;
        let headers = signed_headers(body);

        let tampered = r#"{"type":"user.created","data":{"id":"user_evil"}}"#;
        let err = identity_webhook(State(state), headers, tampered.to_string())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_headers_are_rejected_with_400() {
        let state = state_with_directory(Some(SECRET));
        let err = identity_webhook(State(state), HeaderMap::new(), "{}".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::MissingHeaders));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_secret_is_a_server_error() {
        let state = state_with_directory(None);
        let body = r#"{"type":"user.created","data":{"id":"user_2abc"}}"#;
        let err = identity_webhook(State(state), signed_headers(body), body.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::MissingSecret));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn malformed_known_event_is_rejected() {
        let state = state_with_directory(Some(SECRET));
        // user.created without the required id field
        let body = r#"{"type":"user.created","data":{"first_name":"Ada"}}"#;
        let err = identity_webhook(State(state), signed_headers(body), body.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::MalformedPayload(_)));
    }
}
