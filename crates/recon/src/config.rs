use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ReconError;
use crate::transform::FieldRule;

/// Largest batch the target's search and batch endpoints accept.
pub const TARGET_BATCH_CAP: usize = 100;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// One association job: which snapshot to read, how to resolve each side,
/// and which relation to create between the resolved objects.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub name: String,
    /// Association snapshot, relative to the job file.
    pub input: String,
    pub left: SideConfig,
    pub right: SideConfig,
    pub relation: RelationSpec,
    #[serde(default)]
    pub batching: BatchingConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub preflight: Option<PreflightConfig>,
    #[serde(default)]
    pub transform: Option<TransformConfig>,
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// How one side of the association resolves to target objects.
#[derive(Debug, Clone, Deserialize)]
pub struct SideConfig {
    /// Target object type id, e.g. `2-140990150` or `0-1`.
    pub object_type: String,
    /// Target property holding the business key.
    pub key_property: String,
    /// Snapshot column holding the business key.
    pub key_column: String,
}

// ---------------------------------------------------------------------------
// Relation
// ---------------------------------------------------------------------------

/// Association label created from left object to right object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelationSpec {
    #[serde(default = "default_category")]
    pub category: String,
    pub type_id: u32,
}

fn default_category() -> String {
    "USER_DEFINED".into()
}

// ---------------------------------------------------------------------------
// Batching + Pacing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BatchingConfig {
    #[serde(default = "default_batch")]
    pub page_size: usize,
    #[serde(default = "default_batch")]
    pub max_batch_size: usize,
    #[serde(default = "default_batch")]
    pub lookup_limit: usize,
}

fn default_batch() -> usize {
    TARGET_BATCH_CAP
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            page_size: TARGET_BATCH_CAP,
            max_batch_size: TARGET_BATCH_CAP,
            lookup_limit: TARGET_BATCH_CAP,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

fn default_batch_delay_ms() -> u64 {
    200
}

fn default_page_delay_ms() -> u64 {
    1000
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            batch_delay_ms: default_batch_delay_ms(),
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

impl PacingConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// Preflight + Transform
// ---------------------------------------------------------------------------

/// Entity snapshots the association keys are checked against before a run.
#[derive(Debug, Clone, Deserialize)]
pub struct PreflightConfig {
    pub left_table: String,
    pub left_column: String,
    pub right_table: String,
    pub right_column: String,
}

/// Column → coercion rule for `clean`. Columns not listed pass through as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub columns: BTreeMap<String, FieldRule>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl JobConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: JobConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }
        if self.input.trim().is_empty() {
            return Err(ReconError::ConfigValidation("input must not be empty".into()));
        }

        for (side_name, side) in [("left", &self.left), ("right", &self.right)] {
            for (field, value) in [
                ("object_type", &side.object_type),
                ("key_property", &side.key_property),
                ("key_column", &side.key_column),
            ] {
                if value.trim().is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "{side_name}.{field} must not be empty"
                    )));
                }
            }
        }

        if self.left.key_column == self.right.key_column {
            return Err(ReconError::ConfigValidation(format!(
                "left and right key_column are both '{}'",
                self.left.key_column
            )));
        }

        if self.relation.category.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "relation.category must not be empty".into(),
            ));
        }

        let b = &self.batching;
        if b.page_size == 0 {
            return Err(ReconError::ConfigValidation(
                "batching.page_size must be at least 1".into(),
            ));
        }
        for (field, value) in [("max_batch_size", b.max_batch_size), ("lookup_limit", b.lookup_limit)] {
            if value == 0 || value > TARGET_BATCH_CAP {
                return Err(ReconError::ConfigValidation(format!(
                    "batching.{field} must be between 1 and {TARGET_BATCH_CAP}, got {value}"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
