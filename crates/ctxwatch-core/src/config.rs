//! Bus and watch configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::EntityDescriptor;
use crate::error::Error;
use crate::predicate::Predicate;

/// Default subscription limit for an [`EventBus`](crate::EventBus) (unbounded).
pub const DEFAULT_MAX_SUBSCRIPTIONS: Option<usize> = None;

/// Predicate text used for a watch that names no predicate.
pub const DEFAULT_WATCH_PREDICATE: &str = "true";

/// Event bus configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Maximum number of concurrent subscriptions. None means unbounded.
    pub max_subscriptions: Option<usize>,
}

impl BusConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            max_subscriptions: DEFAULT_MAX_SUBSCRIPTIONS,
        }
    }

    /// Set the subscription limit.
    pub fn with_max_subscriptions(mut self, limit: usize) -> Self {
        self.max_subscriptions = Some(limit);
        self
    }

    /// Remove the subscription limit.
    pub fn unbounded(mut self) -> Self {
        self.max_subscriptions = None;
        self
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One configured watch: an entity name and optional predicate text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSpec {
    /// Entity name to watch.
    pub entity: String,
    /// Predicate text over the entity's fields.
    #[serde(default = "default_predicate")]
    pub predicate: String,
}

fn default_predicate() -> String {
    DEFAULT_WATCH_PREDICATE.to_string()
}

impl WatchSpec {
    /// Watch every object of `entity`.
    pub fn entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            predicate: default_predicate(),
        }
    }

    /// Watch objects of `entity` matching `predicate`.
    pub fn new(entity: impl Into<String>, predicate: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            predicate: predicate.into(),
        }
    }
}

/// A set of watches to register on a [`ChangeWatcher`](crate::ChangeWatcher).
///
/// ```json
/// {
///   "watches": [
///     { "entity": "Post", "predicate": "published == true && views > 100" },
///     { "entity": "Comment" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Configured watches, registered in order.
    #[serde(default)]
    pub watches: Vec<WatchSpec>,
}

impl WatchConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a watch.
    pub fn with_watch(mut self, watch: WatchSpec) -> Self {
        self.watches.push(watch);
        self
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check that there is at least one watch and every watch names an
    /// entity.
    pub fn validate(&self) -> Result<(), Error> {
        if self.watches.is_empty() {
            return Err(Error::InvalidConfig("configuration has no watches".to_string()));
        }
        if let Some(index) = self.watches.iter().position(|w| w.entity.is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "watch {} has an empty entity name",
                index
            )));
        }
        Ok(())
    }

    /// Validate and compile every watch into a registrable clause.
    ///
    /// Fails on the first invalid watch; nothing is returned for a failing
    /// configuration.
    pub fn compile(&self) -> Result<Vec<(EntityDescriptor, Predicate)>, Error> {
        self.validate()?;
        self.watches
            .iter()
            .map(|w| Ok((EntityDescriptor::new(&w.entity), Predicate::parse(&w.predicate)?)))
            .collect()
    }
}
