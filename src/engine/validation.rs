// Hero validation and normalisation
// Enforces the Hero shape before anything reaches the store

use crate::models::{Hero, HeroInput, HeroPatch};
use crate::{HeroServiceError, Result};

/// A create input that passed validation
///
/// `id` is `None` when the caller left id assignment to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidHero {
    pub id: Option<i64>,
    pub name: String,
}

impl ValidHero {
    /// Build the hero, using `fallback` when no id was given
    pub fn into_hero(self, fallback: i64) -> Hero {
        Hero::new(self.id.unwrap_or(fallback), self.name)
    }
}

/// Normalise an optional id: `None` and `0` both mean "absent"
pub fn normalize_id(id: Option<i64>) -> Result<Option<i64>> {
    match id {
        None | Some(0) => Ok(None),
        Some(id) if id < 0 => Err(HeroServiceError::validation(format!(
            "id must be a positive integer, got {}",
            id
        ))),
        Some(id) => Ok(Some(id)),
    }
}

/// Ids used as lookup keys must be present and positive
pub fn require_id(id: i64) -> Result<i64> {
    normalize_id(Some(id))?
        .ok_or_else(|| HeroServiceError::validation("id is required"))
}

/// Parse a path segment such as `/heroes/:id`
///
/// Only non-integers are rejected. Zero and negative ids are valid lookup
/// keys that match no hero.
pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| HeroServiceError::validation(format!("id must be an integer, got '{}'", raw)))
}

fn require_name(name: Option<&str>) -> Result<String> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name.to_string()),
        Some(_) => Err(HeroServiceError::validation("name must not be empty")),
        None => Err(HeroServiceError::validation("name is required")),
    }
}

/// Validate a single create input
pub fn validate_input(input: &HeroInput) -> Result<ValidHero> {
    Ok(ValidHero {
        id: normalize_id(input.id)?,
        name: require_name(input.name.as_deref())?,
    })
}

/// Validate every entry of a batch; entries must carry their own id
pub fn validate_batch(inputs: &[HeroInput]) -> Result<Vec<Hero>> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let valid = validate_input(input)
                .map_err(|e| HeroServiceError::validation(format!("batch entry {}: {}", index, e)))?;
            match valid.id {
                Some(id) => Ok(Hero::new(id, valid.name)),
                None => Err(HeroServiceError::validation(format!(
                    "batch entry {}: id is required",
                    index
                ))),
            }
        })
        .collect()
}

/// Validate a partial update
///
/// The id is the match key. A present name must still be non-empty.
pub fn validate_patch(patch: &HeroPatch) -> Result<HeroPatch> {
    let id = require_id(patch.id)?;
    let name = match patch.name.as_deref() {
        Some(name) => Some(require_name(Some(name))?),
        None => None,
    };
    Ok(HeroPatch { id, name })
}
