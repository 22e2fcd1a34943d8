//! Comparison selection - The side-by-side comparison tray.
//!
//! A [`ComparisonSet`] holds up to [`MAX_COMPARISON_ITEMS`] property snapshots. Each
//! mutation first updates the in-memory list, then writes the whole list to a
//! [`KeyValueStore`] as one JSON value, so the stored copy is never a partial write.
//!
//! Snapshots are copies. Editing a listing afterwards does not change what is in the tray.

use crate::{
    entities::{SystemState, system_state},
    errors::{Error, Result},
    models::Property,
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, warn};

/// Maximum number of properties that can be compared at once.
pub const MAX_COMPARISON_ITEMS: usize = 3;

/// Minimal durable key-value surface used by the comparison tray.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or None if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Durable store backed by the `system_state` table.
#[derive(Debug, Clone)]
pub struct SystemStateStore {
    db: DatabaseConnection,
}

impl SystemStateStore {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for SystemStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let state = SystemState::find()
            .filter(system_state::Column::Key.eq(key))
            .one(&self.db)
            .await?;
        Ok(state.map(|s| s.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now();
        let existing = SystemState::find()
            .filter(system_state::Column::Key.eq(key))
            .one(&self.db)
            .await?;

        if let Some(state) = existing {
            let mut active_model: system_state::ActiveModel = state.into();
            active_model.value = Set(value.to_string());
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_state = system_state::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(now),
                ..Default::default()
            };
            new_state.insert(&self.db).await?;
        }
        Ok(())
    }
}

/// Volatile store, used in tests and when no database is wanted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: std::sync::Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Result of [`ComparisonSet::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The property joined the tray
    Added,
    /// It was already there; nothing changed
    AlreadyPresent,
}

/// The comparison tray. Create one at startup with [`ComparisonSet::load`] and share it.
#[derive(Debug)]
pub struct ComparisonSet<S> {
    store: S,
    key: String,
    items: Vec<Property>,
    ids: HashSet<String>,
}

/// Parses persisted state. Anything unreadable becomes an empty tray; duplicates are dropped
/// and the list is cut to capacity.
fn decode_items(raw: &str) -> Vec<Property> {
    let decoded: Vec<Property> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("Discarding unreadable comparison state: {}", e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    decoded
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .take(MAX_COMPARISON_ITEMS)
        .collect()
}

impl<S: KeyValueStore> ComparisonSet<S> {
    /// Rehydrates the tray from `store`. A failing or corrupt store yields an empty tray.
    pub async fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = match store.get(&key).await {
            Ok(Some(raw)) => decode_items(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read comparison state '{}': {}", key, e);
                Vec::new()
            }
        };
        debug!("Loaded {} comparison item(s)", items.len());
        let ids = items.iter().map(|p| p.id.clone()).collect();
        Self {
            store,
            key,
            items,
            ids,
        }
    }

    async fn persist(&self) -> Result<()> {
        let encoded = serde_json::to_string(&self.items)?;
        if let Err(e) = self.store.set(&self.key, &encoded).await {
            error!("Failed to persist comparison state: {}", e);
            return Err(e);
        }
        Ok(())
    }

    /// Adds a snapshot of `property`.
    ///
    /// # Errors
    /// Returns [`Error::ComparisonFull`] when the tray is full (state untouched), or the
    /// store error if the new state could not be written.
    pub async fn add(&mut self, property: &Property) -> Result<AddOutcome> {
        if self.contains(&property.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        if self.items.len() >= MAX_COMPARISON_ITEMS {
            info!("Comparison tray full, rejecting {}", property.id);
            return Err(Error::ComparisonFull {
                capacity: MAX_COMPARISON_ITEMS,
            });
        }

        self.ids.insert(property.id.clone());
        self.items.push(property.clone());
        self.persist().await?;
        Ok(AddOutcome::Added)
    }

    /// Removes `id`; returns whether anything was removed. Absent ids are a no-op.
    ///
    /// # Errors
    /// Returns the store error if the new state could not be written.
    pub async fn remove(&mut self, id: &str) -> Result<bool> {
        if !self.ids.remove(id) {
            return Ok(false);
        }
        self.items.retain(|p| p.id != id);
        self.persist().await?;
        Ok(true)
    }

    /// Empties the tray.
    ///
    /// # Errors
    /// Returns the store error if the new state could not be written.
    pub async fn clear(&mut self) -> Result<()> {
        self.items.clear();
        self.ids.clear();
        self.persist().await
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Snapshots in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Property] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
