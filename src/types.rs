//! Common types used throughout the fileset sink
//!
//! Shared type aliases used across multiple modules.

use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A structured input record: field name to dynamically-typed value
pub type InputRecord = JsonObject;

/// String key-value map with deterministic iteration order
pub type StringMap = BTreeMap<String, String>;
