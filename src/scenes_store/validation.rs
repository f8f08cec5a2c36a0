//! Validation for curated scene entities before they are written.

use super::models::{Microgenre, Scene, SceneMembership};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref SLUG_PATTERN: Regex = Regex::new(r"^[a-z0-9-]+$").expect("valid slug regex");
}

/// Validation error types
#[derive(Debug, PartialEq)]
pub enum ValidationError {
    EmptyField { field: &'static str },
    InvalidSlug { field: &'static str, value: String },
    ConfidenceOutOfRange { value: f64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField { field } => {
                write!(f, "Field '{}' is required but was empty", field)
            }
            ValidationError::InvalidSlug { field, value } => write!(
                f,
                "Field '{}' must be lowercase alphanumeric with hyphens, got '{}'",
                field, value
            ),
            ValidationError::ConfidenceOutOfRange { value } => {
                write!(f, "Confidence must be between 0 and 1, got {}", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn validate_slug(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    if !SLUG_PATTERN.is_match(value) {
        return Err(ValidationError::InvalidSlug {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn validate_name(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

pub fn validate_scene(scene: &Scene) -> ValidationResult<()> {
    validate_slug("slug", &scene.slug)?;
    validate_name("name", &scene.name)?;
    for microgenre in &scene.microgenres {
        validate_slug("microgenres", microgenre)?;
    }
    Ok(())
}

pub fn validate_microgenre(microgenre: &Microgenre) -> ValidationResult<()> {
    validate_slug("slug", &microgenre.slug)?;
    validate_name("name", &microgenre.name)?;
    if let Some(parent) = &microgenre.parent_scene_slug {
        validate_slug("parent_scene_slug", parent)?;
    }
    Ok(())
}

pub fn validate_membership(membership: &SceneMembership) -> ValidationResult<()> {
    validate_name("entity_slug", &membership.entity_slug)?;
    validate_slug("scene_slug", &membership.scene_slug)?;
    if !(0.0..=1.0).contains(&membership.confidence) {
        return Err(ValidationError::ConfidenceOutOfRange {
            value: membership.confidence,
        });
    }
    Ok(())
}
