//! Agent Card - discovery metadata served by an A2A agent

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known path the card is served at, relative to the agent base URL
pub const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Agent Card as fetched from the target.
///
/// Required fields are kept as `Option<String>` so an incomplete card still
/// deserializes; absence is reported by `missing_required_fields` instead of
/// failing the parse. `capabilities` and `provider` stay untyped because the
/// compliance check inspects their shape explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentCard {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub protocol_version: Option<String>,
    pub capabilities: Option<Value>,
    pub provider: Option<Value>,
}

impl AgentCard {
    /// Names of required card fields that are absent or blank
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let required = [
            ("name", &self.name),
            ("version", &self.version),
            ("description", &self.description),
            ("protocolVersion", &self.protocol_version),
        ];

        let mut missing = Vec::new();
        for (field, value) in required {
            match value {
                Some(v) if !v.trim().is_empty() => {}
                _ => missing.push(field),
            }
        }
        missing
    }

    /// The `capabilities.streaming` value, if the card declares one
    pub fn streaming_capability(&self) -> Option<&Value> {
        self.capabilities.as_ref().and_then(|c| c.get("streaming"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card(value: serde_json::Value) -> AgentCard {
        serde_json::from_value(value).expect("card should deserialize")
    }

    #[test]
    fn complete_card_has_no_missing_fields() {
        let card = card(json!({
            "name": "echo",
            "version": "1.0.0",
            "description": "echoes input",
            "protocolVersion": "0.3"
        }));
        assert!(card.missing_required_fields().is_empty());
    }

    #[test]
    fn absent_fields_are_reported_by_name() {
        let card = card(json!({ "name": "echo", "version": "1.0.0" }));
        assert_eq!(
            card.missing_required_fields(),
            vec!["description", "protocolVersion"]
        );
    }

    #[test]
    fn blank_field_counts_as_missing() {
        let card = card(json!({
            "name": "  ",
            "version": "1.0.0",
            "description": "echoes input",
            "protocolVersion": "0.3"
        }));
        assert_eq!(card.missing_required_fields(), vec!["name"]);
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let card = card(json!({
            "name": "echo",
            "version": "1.0.0",
            "description": "echoes input",
            "protocolVersion": "0.3",
            "skills": [{"id": "echo", "name": "Echo"}],
            "url": "http://localhost:9001"
        }));
        assert!(card.missing_required_fields().is_empty());
    }

    #[test]
    fn streaming_capability_is_exposed() {
        let card = card(json!({
            "name": "echo",
            "version": "1.0.0",
            "description": "echoes input",
            "protocolVersion": "0.3",
            "capabilities": {"streaming": true}
        }));
        assert_eq!(card.streaming_capability(), Some(&json!(true)));

        let bare = AgentCard::default();
        assert!(bare.streaming_capability().is_none());
    }

    #[test]
    fn non_object_body_does_not_deserialize() {
        assert!(serde_json::from_value::<AgentCard>(json!("not a card")).is_err());
        assert!(serde_json::from_value::<AgentCard>(json!([1, 2, 3])).is_err());
    }
}
