//! Key-value persistence layer.
//!
//! The platform stores all identity records in one table addressed by a
//! partition key / sort key pair plus a single secondary index. The
//! concrete network client is injected behind [`KeyValueStore`]; the
//! in-process [`MemoryStore`] implements the same conditional and
//! transactional semantics for local runs and tests.

mod identity;
mod memory;

pub use identity::{IdentityStore, UniqueAttribute};
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A conditional put found an existing item at the named key.
    #[error("conditional check failed for {pk}/{sk}")]
    ConditionFailed { pk: String, sk: String },

    #[error("item at {pk}/{sk} could not be decoded: {source}")]
    Corrupt {
        pk: String,
        sk: String,
        source: serde_json::Error,
    },

    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// One stored item. `gsi1pk` projects the item into the secondary index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub pk: String,
    pub sk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gsi1pk: Option<String>,
    pub body: serde_json::Value,
}

impl Item {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
            gsi1pk: None,
            body,
        }
    }

    pub fn with_index(mut self, gsi1pk: impl Into<String>) -> Self {
        self.gsi1pk = Some(gsi1pk.into());
        self
    }
}

/// A put participating in a transactional write.
#[derive(Debug, Clone)]
pub struct ConditionalPut {
    pub item: Item,
    /// Require that no item exists at the key. The uniqueness-index
    /// records rely on this.
    pub if_absent: bool,
}

impl ConditionalPut {
    pub fn if_absent(item: Item) -> Self {
        Self {
            item,
            if_absent: true,
        }
    }

    pub fn unconditional(item: Item) -> Self {
        Self {
            item,
            if_absent: false,
        }
    }
}

/// Capability interface over the partition/sort keyed table.
///
/// Implementations must be safe for concurrent use; every call is
/// stateless apart from its arguments.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, pk: &str, sk: &str) -> Result<Option<Item>, StoreError>;

    async fn put(&self, item: Item) -> Result<(), StoreError>;

    /// Write all puts atomically. If any `if_absent` condition fails the
    /// whole batch is rejected with [`StoreError::ConditionFailed`] naming
    /// the first conflicting key, and no item is written.
    async fn transact_put(&self, puts: Vec<ConditionalPut>) -> Result<(), StoreError>;

    /// Items under one partition key whose sort key starts with `sk_prefix`,
    /// ordered by sort key.
    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, StoreError>;

    /// Items projected into the secondary index under `gsi1pk`.
    async fn query_index(&self, gsi1pk: &str) -> Result<Vec<Item>, StoreError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
