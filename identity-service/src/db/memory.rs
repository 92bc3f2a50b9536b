use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{ConditionalPut, Item, KeyValueStore, StoreError};

/// In-process table implementation.
///
/// A single lock guards the whole map so `transact_put` is genuinely
/// all-or-nothing, matching the semantics the production client provides
/// via conditional transactional writes.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<(String, String), Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, pk: &str, sk: &str) -> Result<Option<Item>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(items.get(&(pk.to_string(), sk.to_string())).cloned())
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        items.insert((item.pk.clone(), item.sk.clone()), item);
        Ok(())
    }

    async fn transact_put(&self, puts: Vec<ConditionalPut>) -> Result<(), StoreError> {
        let mut items = self
            .items
            .write()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;

        // Check every condition before touching the map
        for put in &puts {
            let key = (put.item.pk.clone(), put.item.sk.clone());
            if put.if_absent && items.contains_key(&key) {
                return Err(StoreError::ConditionFailed {
                    pk: put.item.pk.clone(),
                    sk: put.item.sk.clone(),
                });
            }
        }

        for put in puts {
            items.insert((put.item.pk.clone(), put.item.sk.clone()), put.item);
        }
        Ok(())
    }

    async fn query_prefix(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(items
            .range((pk.to_string(), sk_prefix.to_string())..)
            .take_while(|((item_pk, item_sk), _)| item_pk == pk && item_sk.starts_with(sk_prefix))
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn query_index(&self, gsi1pk: &str) -> Result<Vec<Item>, StoreError> {
        let items = self
            .items
            .read()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(items
            .values()
            .filter(|item| item.gsi1pk.as_deref() == Some(gsi1pk))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
