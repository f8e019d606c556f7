// Hero domain model
// The single record type kept by the service and its inbound shapes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{HeroServiceError, Result};

/// A persisted hero as seen by clients
///
/// Store internals (object id, revision) never appear here; the store adapter
/// strips them before a `Hero` is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub id: i64,
    pub name: String,
}

impl Hero {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Inbound hero for create operations
///
/// Both fields are optional on the wire. A missing or zero `id` means
/// "assign one for me"; a missing `name` is rejected by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl HeroInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    pub fn with_id(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
        }
    }
}

impl From<Hero> for HeroInput {
    fn from(hero: Hero) -> Self {
        Self::with_id(hero.id, hero.name)
    }
}

/// Partial update matched by `id`
///
/// Only the fields that are present get overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroPatch {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The three body shapes accepted by create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatePayload {
    /// Bulk insert
    Batch(Vec<HeroInput>),
    /// A single hero with an optional id
    Single(HeroInput),
    /// `{token}`: a signed envelope carrying the hero
    Envelope { token: String },
}

impl CreatePayload {
    /// Classify a raw JSON body
    ///
    /// Arrays are batches, objects carrying a `token` key are envelopes and
    /// any other object is a single hero.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => {
                let heroes = items
                    .into_iter()
                    .map(serde_json::from_value::<HeroInput>)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| HeroServiceError::validation(format!("invalid hero in batch: {}", e)))?;
                Ok(CreatePayload::Batch(heroes))
            }
            Value::Object(mut fields) => {
                if let Some(token) = fields.remove("token") {
                    return match token {
                        Value::String(token) => Ok(CreatePayload::Envelope { token }),
                        other => Err(HeroServiceError::validation(format!(
                            "token must be a string, got {}",
                            other
                        ))),
                    };
                }
                let hero = serde_json::from_value::<HeroInput>(Value::Object(fields))
                    .map_err(|e| HeroServiceError::validation(format!("invalid hero: {}", e)))?;
                Ok(CreatePayload::Single(hero))
            }
            other => Err(HeroServiceError::validation(format!(
                "expected a hero, a list of heroes or a token envelope, got {}",
                other
            ))),
        }
    }
}

impl TryFrom<Value> for CreatePayload {
    type Error = HeroServiceError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

/// The classic Tour of Heroes roster, used for seeding
pub fn default_heroes() -> Vec<Hero> {
    [
        (1, "Dr. Nice"),
        (2, "Narco"),
        (3, "Bombasto"),
        (4, "Celeritas"),
        (5, "Magneta"),
        (6, "RubberMan"),
        (7, "Dynama"),
        (8, "Dr. IQ"),
        (9, "Magma"),
        (10, "Tornado"),
    ]
    .into_iter()
    .map(|(id, name)| Hero::new(id, name))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_body_is_a_batch() {
        let payload = CreatePayload::from_value(json!([
            {"id": 1, "name": "Dr. Nice"},
            {"id": 2, "name": "Narco"}
        ]))
        .unwrap();

        assert_eq!(
            payload,
            CreatePayload::Batch(vec![
                HeroInput::with_id(1, "Dr. Nice"),
                HeroInput::with_id(2, "Narco"),
            ])
        );
    }

    #[test]
    fn test_token_key_wins_over_hero_fields() {
        let payload =
            CreatePayload::from_value(json!({"token": "abc.def.ghi", "name": "ignored"})).unwrap();
        assert_eq!(
            payload,
            CreatePayload::Envelope {
                token: "abc.def.ghi".to_string()
            }
        );
    }

    #[test]
    fn test_non_string_token_is_rejected() {
        let err = CreatePayload::from_value(json!({"token": 42})).unwrap_err();
        assert_eq!(err.kind(), "ValidationFailure");
    }

    #[test]
    fn test_plain_object_is_a_single_hero() {
        let payload = CreatePayload::from_value(json!({"name": "Local"})).unwrap();
        assert_eq!(payload, CreatePayload::Single(HeroInput::named("Local")));
    }

    #[test]
    fn test_scalar_body_is_rejected() {
        assert!(CreatePayload::from_value(json!("Local")).is_err());
        assert!(CreatePayload::from_value(Value::Null).is_err());
    }

    #[test]
    fn test_default_roster() {
        let heroes = default_heroes();
        assert_eq!(heroes.len(), 10);
        assert_eq!(heroes[0], Hero::new(1, "Dr. Nice"));
        assert_eq!(heroes[7], Hero::new(8, "Dr. IQ"));
    }
}
