//! Inventory configuration

use crate::equipment::{EquipmentSlot, SlotFilter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Equipment slot definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Slot name
    pub name: String,
    /// Reject every item
    pub blocked: bool,
    /// Accepted item kinds (empty = any)
    pub allowed_kinds: Vec<String>,
    /// Never used by auto-equip
    pub skip_auto_equip: bool,
}

impl SlotConfig {
    /// Unfiltered slot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Restrict the slot to the given item kinds
    pub fn with_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Build the runtime slot
    pub fn to_slot(&self) -> EquipmentSlot {
        let mut slot = EquipmentSlot::new(self.name.clone())
            .with_blocked(self.blocked)
            .with_filter(SlotFilter::kinds(self.allowed_kinds.iter().cloned()));
        slot.skip_auto_equip = self.skip_auto_equip;
        slot
    }
}

/// Grid inventory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Grid columns (0 = no grid)
    pub grid_width: usize,

    /// Grid rows (0 = no grid)
    pub grid_height: usize,

    /// Let pickups fall into equipment slots
    pub auto_equip: bool,

    /// Try equipment slots before the grid when auto-equipping
    pub auto_equip_first: bool,

    /// Merge pickups into matching stacks before placing them
    pub auto_stack: bool,

    /// Allow socketable items to attach into socketed hosts
    pub allow_socketing: bool,

    /// Seconds between auto-detect passes
    pub auto_detect_rate: f32,

    /// Equipment slots, in index order
    pub equipment: Vec<SlotConfig>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 4,
            auto_equip: true,
            auto_equip_first: true,
            auto_stack: true,
            allow_socketing: true,
            auto_detect_rate: 1.0,
            equipment: Vec::new(),
        }
    }
}

impl InventoryConfig {
    /// Configuration with the given grid size and defaults otherwise
    pub fn grid(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Add an equipment slot
    pub fn with_slot(mut self, slot: SlotConfig) -> Self {
        self.equipment.push(slot);
        self
    }

    /// Set auto-equip
    pub fn with_auto_equip(mut self, enabled: bool) -> Self {
        self.auto_equip = enabled;
        self
    }

    /// Set whether equipment is preferred over the grid
    pub fn with_auto_equip_first(mut self, first: bool) -> Self {
        self.auto_equip_first = first;
        self
    }

    /// Set auto-stack
    pub fn with_auto_stack(mut self, enabled: bool) -> Self {
        self.auto_stack = enabled;
        self
    }

    /// Set socketing
    pub fn with_socketing(mut self, enabled: bool) -> Self {
        self.allow_socketing = enabled;
        self
    }

    /// Set the auto-detect rate in seconds
    pub fn with_auto_detect_rate(mut self, seconds: f32) -> Self {
        self.auto_detect_rate = seconds;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: InventoryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges and slot names
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.auto_detect_rate.is_finite() || self.auto_detect_rate <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "auto_detect_rate must be a positive number of seconds, got {}",
                self.auto_detect_rate
            )));
        }

        for (index, slot) in self.equipment.iter().enumerate() {
            if slot.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "equipment slot {} has no name",
                    index
                )));
            }
            if self.equipment[..index].iter().any(|s| s.name == slot.name) {
                return Err(ConfigError::Validation(format!(
                    "duplicate equipment slot name: {}",
                    slot.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InventoryConfig::default();

        assert_eq!((config.grid_width, config.grid_height), (10, 4));
        assert!(config.auto_equip && config.auto_equip_first);
        assert!(config.auto_stack);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = InventoryConfig::from_toml_str(
            r#"
            grid_width = 6
            grid_height = 8
            auto_equip_first = false

            [[equipment]]
            name = "head"
            allowed_kinds = ["helmet"]

            [[equipment]]
            name = "belt"
            skip_auto_equip = true
            "#,
        )
        .unwrap();

        assert_eq!((config.grid_width, config.grid_height), (6, 8));
        assert!(!config.auto_equip_first);
        assert!(config.auto_stack);
        assert_eq!(config.equipment.len(), 2);
        assert_eq!(config.equipment[0].allowed_kinds, vec!["helmet".to_string()]);

        let belt = config.equipment[1].to_slot();
        assert!(!belt.is_auto_equip_target());
    }

    #[test]
    fn test_parse_error() {
        let result = InventoryConfig::from_toml_str("grid_width = \"wide\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation() {
        let config = InventoryConfig::grid(2, 2)
            .with_slot(SlotConfig::new("hand"))
            .with_slot(SlotConfig::new("hand"));
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = InventoryConfig::grid(2, 2).with_auto_detect_rate(0.0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = InventoryConfig::from_file("/nonexistent/inventory.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
