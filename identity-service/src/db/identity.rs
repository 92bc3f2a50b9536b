//! Typed single-table access for identity records.
//!
//! Record layout:
//! - User:           PK=USER#<id>        SK=METADATA        GSI1PK=EMAIL#<email>
//! - Username-index: PK=USERNAME#<name>  SK=METADATA
//! - Email-index:    PK=EMAIL#<email>    SK=METADATA
//! - Session:        PK=USER#<userId>    SK=SESSION#<sid>   GSI1PK=SESSION#<sid>
//!
//! The mere existence of an index record enforces uniqueness of its
//! attribute; `create_user` writes all three records as one conditional
//! transaction so no orphaned user can appear under concurrent signups.

use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

use super::{ConditionalPut, Item, KeyValueStore, StoreError};
use crate::models::{Session, User};

const METADATA_SK: &str = "METADATA";
const SESSION_SK_PREFIX: &str = "SESSION#";

fn user_pk(user_id: &str) -> String {
    format!("USER#{}", user_id)
}

fn username_pk(username: &str) -> String {
    format!("USERNAME#{}", username)
}

fn email_pk(email: &str) -> String {
    format!("EMAIL#{}", email)
}

fn session_sk(session_id: &str) -> String {
    format!("SESSION#{}", session_id)
}

/// Which uniqueness index rejected a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueAttribute {
    Username,
    Email,
}

impl IdentityStore {
    /// Map a transaction rejection back to the attribute that collided.
    pub fn conflicting_attribute(err: &StoreError) -> Option<UniqueAttribute> {
        match err {
            StoreError::ConditionFailed { pk, .. } if pk.starts_with("USERNAME#") => {
                Some(UniqueAttribute::Username)
            }
            StoreError::ConditionFailed { pk, .. } if pk.starts_with("EMAIL#") => {
                Some(UniqueAttribute::Email)
            }
            // The user item itself collided; uuid collision is not a
            // realistic path, treat as email conflict for the caller.
            StoreError::ConditionFailed { .. } => Some(UniqueAttribute::Email),
            _ => None,
        }
    }
}

/// Identity Store over the injected key-value client.
#[derive(Clone)]
pub struct IdentityStore {
    store: Arc<dyn KeyValueStore>,
}

impl IdentityStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    fn decode<T: DeserializeOwned>(item: Item) -> Result<T, StoreError> {
        serde_json::from_value(item.body.clone()).map_err(|source| StoreError::Corrupt {
            pk: item.pk,
            sk: item.sk,
            source,
        })
    }

    // ==================== User Operations ====================

    /// Persist a new user with both uniqueness-index records.
    ///
    /// All three items are committed or rejected as one unit; a rejection
    /// means the username or email is already taken (see
    /// [`IdentityStore::conflicting_attribute`]).
    pub async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let user_item = Item::new(
            user_pk(&user.user_id),
            METADATA_SK,
            serde_json::to_value(user).map_err(|e| anyhow::Error::new(e))?,
        )
        .with_index(email_pk(&user.email));

        let username_item = Item::new(
            username_pk(&user.username),
            METADATA_SK,
            json!({ "user_id": user.user_id }),
        );

        let email_item = Item::new(
            email_pk(&user.email),
            METADATA_SK,
            json!({ "user_id": user.user_id }),
        );

        self.store
            .transact_put(vec![
                ConditionalPut::if_absent(user_item),
                ConditionalPut::if_absent(username_item),
                ConditionalPut::if_absent(email_item),
            ])
            .await
    }

    pub async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        match self.store.get(&user_pk(user_id), METADATA_SK).await? {
            Some(item) => Ok(Some(Self::decode(item)?)),
            None => Ok(None),
        }
    }

    /// Resolve a normalized username to a user id via its index record.
    pub async fn find_user_id_by_username(
        &self,
        username: &str,
    ) -> Result<Option<String>, StoreError> {
        match self.store.get(&username_pk(username), METADATA_SK).await? {
            Some(item) => {
                let body: serde_json::Value = item.body.clone();
                Ok(body
                    .get("user_id")
                    .and_then(|v| v.as_str())
                    .map(str::to_string))
            }
            None => Ok(None),
        }
    }

    /// Look up a user by normalized email through the secondary index on
    /// the user record itself.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut items = self.store.query_index(&email_pk(email)).await?;
        match items.pop() {
            Some(item) => Ok(Some(Self::decode(item)?)),
            None => Ok(None),
        }
    }

    // ==================== Session Operations ====================

    pub async fn put_session(&self, session: &Session) -> Result<(), StoreError> {
        let item = Item::new(
            user_pk(&session.user_id),
            session_sk(&session.session_id),
            serde_json::to_value(session).map_err(|e| anyhow::Error::new(e))?,
        )
        .with_index(session_sk(&session.session_id));
        self.store.put(item).await
    }

    /// Fetch a session by its id alone, via the secondary index.
    pub async fn find_session(&self, session_id: &str) -> Result<Option<Session>, StoreError> {
        let mut items = self.store.query_index(&session_sk(session_id)).await?;
        match items.pop() {
            Some(item) => Ok(Some(Self::decode(item)?)),
            None => Ok(None),
        }
    }

    /// All sessions belonging to a user, ordered by session id.
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let items = self
            .store
            .query_prefix(&user_pk(user_id), SESSION_SK_PREFIX)
            .await?;
        items.into_iter().map(Self::decode).collect()
    }
}
