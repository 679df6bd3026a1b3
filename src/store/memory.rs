//! In-memory implementation of [`Store`], used to test resolver logic without
//! a running database.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::{EventRecord, NewEvent, NewUser, Store, StoreError, UserRecord};


#[derive(Default)]
pub(crate) struct MemStore {
    inner: Mutex<Inner>,
    user_lookups: AtomicUsize,
}

impl MemStore {
    /// Number of `user_by_id` calls made so far. Lets tests observe whether
    /// lookups were deduplicated.
    pub(crate) fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::Relaxed)
    }
}

#[derive(Default)]
struct Inner {
    events: Vec<EventRecord>,
    users: Vec<UserRecord>,
}

#[async_trait]
impl Store for MemStore {
    async fn events(&self) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self.inner.lock().unwrap().events.clone())
    }

    async fn events_by_creator(&self, creator: &str) -> Result<Vec<EventRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.events.iter().filter(|e| e.creator == creator).cloned().collect())
    }

    async fn insert_event(&self, event: NewEvent) -> Result<EventRecord, StoreError> {
        let record = EventRecord {
            id: ObjectId::new().to_hex(),
            title: event.title,
            description: event.description,
            price: event.price,
            date: event.date,
            creator: event.creator,
        };
        self.inner.lock().unwrap().events.push(record.clone());

        Ok(record)
    }

    async fn users(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.inner.lock().unwrap().users.clone())
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.user_lookups.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        // Check and insert under the same lock. This mirrors what the unique
        // index does for the MongoDB store: two concurrent inserts with the
        // same email cannot both succeed.
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        let record = UserRecord {
            id: ObjectId::new().to_hex(),
            email: user.email,
            password_hash: user.password_hash,
        };
        inner.users.push(record.clone());

        Ok(record)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "$2b$12$irrelevant".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemStore::default();
        store.insert_user(new_user("marcus@example.com")).await.unwrap();

        let err = store.insert_user(new_user("marcus@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(email) if email == "marcus@example.com"));
        assert_eq!(store.users().await.unwrap().len(), 1);
    }

    /// Two concurrent inserts with the same email: exactly one must win. The
    /// check-and-insert is atomic, so this cannot end up with two stored
    /// users no matter how the tasks interleave.
    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_duplicate_emails_insert_once() {
        let store = Arc::new(MemStore::default());

        let a = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.insert_user(new_user("race@example.com")).await }
        });
        let b = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.insert_user(new_user("race@example.com")).await }
        });

        let outcomes = [a.await.unwrap(), b.await.unwrap()];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(store.users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn events_by_creator_filters() {
        let store = MemStore::default();
        let user_a = store.insert_user(new_user("a@example.com")).await.unwrap();
        let user_b = store.insert_user(new_user("b@example.com")).await.unwrap();

        for (title, creator) in [("one", &user_a), ("two", &user_b), ("three", &user_a)] {
            store.insert_event(NewEvent {
                title: title.into(),
                description: "desc".into(),
                price: 1.0,
                date: chrono::Utc::now(),
                creator: creator.id.clone(),
            }).await.unwrap();
        }

        let of_a = store.events_by_creator(&user_a.id).await.unwrap();
        assert_eq!(
            of_a.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(),
            ["one", "three"],
        );
        assert!(store.events_by_creator("unknown").await.unwrap().is_empty());
    }
}
