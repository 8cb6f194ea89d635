//! Canonical naming grammars and wire-to-local name translation.
//!
//! Canonical names look like `sys$Config`: a namespace prefix of lowercase
//! letters, a literal `$`, and the type identifier. Entity identifiers are
//! PascalCase; enum identifiers may lead with a lowercase letter. All
//! checks are local and synchronous.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{NameRule, ReconcileError};

const PREFIX_PATTERN: &str = "^[a-z][a-zA-Z]*$";
const ENTITY_SUFFIX_PATTERN: &str = "^[A-Z][a-zA-Z0-9]*$";
const ENUM_SUFFIX_PATTERN: &str = "^[A-Za-z][a-zA-Z0-9]*$";

fn prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PREFIX_PATTERN).expect("hardcoded pattern"))
}

fn entity_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENTITY_SUFFIX_PATTERN).expect("hardcoded pattern"))
}

fn enum_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENUM_SUFFIX_PATTERN).expect("hardcoded pattern"))
}

/// Split a canonical name at the `$` separator into (prefix, suffix).
///
/// # Errors
///
/// Returns `ReconcileError::InvalidFormat` when the separator is absent.
pub fn split_name(name: &str) -> Result<(&str, &str), ReconcileError> {
    name.split_once('$')
        .ok_or_else(|| ReconcileError::InvalidFormat {
            name: name.to_string(),
            rule: NameRule::MissingSeparator,
        })
}

/// Validate an entity metaclass name (`sys$Config`).
///
/// # Errors
///
/// Returns `ReconcileError::InvalidFormat` naming the violated rule.
pub fn validate_entity_name(name: &str) -> Result<(), ReconcileError> {
    let (prefix, suffix) = split_name(name)?;
    if !prefix_re().is_match(prefix) {
        return Err(ReconcileError::InvalidFormat {
            name: name.to_string(),
            rule: NameRule::Prefix,
        });
    }
    if !entity_suffix_re().is_match(suffix) {
        return Err(ReconcileError::InvalidFormat {
            name: name.to_string(),
            rule: NameRule::EntitySuffix,
        });
    }
    Ok(())
}

/// Validate a canonical enum name.
///
/// Shares the prefix rule with entity names; the suffix additionally
/// admits a lowercase leading letter.
///
/// # Errors
///
/// Returns `ReconcileError::InvalidFormat` naming the violated rule.
pub fn validate_enum_name(name: &str) -> Result<(), ReconcileError> {
    let (prefix, suffix) = split_name(name)?;
    if !prefix_re().is_match(prefix) {
        return Err(ReconcileError::InvalidFormat {
            name: name.to_string(),
            rule: NameRule::Prefix,
        });
    }
    if !enum_suffix_re().is_match(suffix) {
        return Err(ReconcileError::InvalidFormat {
            name: name.to_string(),
            rule: NameRule::EnumSuffix,
        });
    }
    Ok(())
}

/// Convert a wire field name to the local PascalCase property name.
///
/// Handles both lower-camel (`createTs` -> `CreateTs`) and snake_case
/// (`created_by` -> `CreatedBy`) wire spellings.
pub fn to_pascal_case(wire: &str) -> String {
    wire.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
