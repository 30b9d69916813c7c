use super::error::WebhookError;
use serde::Deserialize;

/// Raw envelope of a provider event. The payload stays untyped until the
/// event kind is known.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    data: serde_json::Value,
}

/// The user fields this service consumes from a provider profile. Extra
/// provider fields are tolerated; a missing id is not.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IdentityProfile {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl IdentityProfile {
    /// Display name assembled from whatever name parts the provider sent,
    /// with a placeholder when both are missing.
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();
        if name.is_empty() {
            "User".to_string()
        } else {
            name
        }
    }
}

/// The explicitly-tagged union of provider events this service understands.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityEvent {
    UserCreated(IdentityProfile),
    UserUpdated(IdentityProfile),
    UserDeleted { id: String },
    /// Event kinds this service does not consume; acknowledged unchanged.
    Ignored { kind: String },
}

/// Parses a verified webhook body. Known event kinds must match their
/// expected shape; unknown kinds are passed through as [`IdentityEvent::Ignored`].
pub fn parse_event(body: &str) -> Result<IdentityEvent, WebhookError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

    match envelope.kind.as_str() {
        "user.created" => Ok(IdentityEvent::UserCreated(parse_profile(envelope.data)?)),
        "user.updated" => Ok(IdentityEvent::UserUpdated(parse_profile(envelope.data)?)),
        "user.deleted" => {
            #[derive(Deserialize)]
            struct Deleted {
                id: String,
            }
            let deleted: Deleted = serde_json::from_value(envelope.data)
                .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;
            Ok(IdentityEvent::UserDeleted { id: deleted.id })
        }
        _ => Ok(IdentityEvent::Ignored {
            kind: envelope.kind,
        }),
    }
}

fn parse_profile(data: serde_json::Value) -> Result<IdentityProfile, WebhookError> {
    serde_json::from_value(data).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
}
