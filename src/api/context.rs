use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use crate::{
    api::err::ApiResult,
    auth::Caller,
    store::{Store, UserRecord},
};


/// The context that is accessible to every resolver in our API. One instance
/// is created per HTTP request.
pub(crate) struct Context {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) caller: Caller,

    /// Request-scoped cache for user lookups, keyed by user ID. `None` caches
    /// the absence of a user.
    user_cache: Mutex<HashMap<String, Option<UserRecord>>>,
}

impl juniper::Context for Context {}

impl Context {
    pub(crate) fn new(store: Arc<dyn Store>, caller: Caller) -> Self {
        Self {
            store,
            caller,
            user_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Loads a user by ID through the request-scoped cache. Resolving the
    /// `creator` field of n events would otherwise issue n independent
    /// lookups; with the cache, each distinct creator is fetched at most once
    /// per request.
    pub(crate) async fn load_user(&self, id: &str) -> ApiResult<Option<UserRecord>> {
        // The lock is held across the store call: two concurrent misses for
        // the same id must not both hit the store.
        let mut cache = self.user_cache.lock().await;
        if let Some(hit) = cache.get(id) {
            return Ok(hit.clone());
        }

        let user = self.store.user_by_id(id).await?;
        cache.insert(id.to_owned(), user.clone());

        Ok(user)
    }
}
