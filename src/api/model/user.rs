use juniper::{graphql_object, GraphQLInputObject, ID};

use crate::{
    api::{
        Context,
        err::{conflict, internal_server_error, invalid_input, ApiResult},
    },
    auth,
    store::{NewUser, UserRecord},
};
use super::event::Event;


pub(crate) struct User(UserRecord);

#[graphql_object(context = Context)]
impl User {
    fn id(&self) -> ID {
        ID::from(self.0.id.clone())
    }

    fn email(&self) -> &str {
        &self.0.email
    }

    /// Always `null`. The stored password hash is never exposed through the
    /// API, no matter who asks.
    fn password(&self) -> Option<&str> {
        None
    }

    /// All events created by this user, in insertion order. Derived from the
    /// events' `creator` field, so this is a single store query.
    async fn created_events(&self, context: &Context) -> ApiResult<Vec<Event>> {
        Event::load_for_creator(&self.0.id, context).await
    }
}

/// Input payload for `createUser`.
#[derive(Debug, Clone, GraphQLInputObject)]
pub(crate) struct UserInput {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl User {
    pub(crate) fn from_record(record: UserRecord) -> Self {
        Self(record)
    }

    pub(crate) async fn load_all(context: &Context) -> ApiResult<Vec<Self>> {
        Ok(context.store.users().await?.into_iter().map(Self).collect())
    }

    pub(crate) async fn create(input: UserInput, context: &Context) -> ApiResult<Self> {
        if !input.email.contains('@') {
            return Err(invalid_input!("'{}' is not a valid email address", input.email));
        }
        if input.password.is_empty() {
            return Err(invalid_input!("password must not be empty"));
        }

        // This check alone cannot prevent duplicate emails: two concurrent
        // requests can both pass it. The store rejects the second insert
        // below, this is just for the nicer error in the common case.
        if context.store.user_by_email(&input.email).await?.is_some() {
            return Err(conflict!("a user with email '{}' already exists", input.email));
        }

        let password_hash = auth::hash_password(input.password).await
            .map_err(|e| internal_server_error!("could not hash password: {e}"))?;

        let record = context.store.insert_user(NewUser {
            email: input.email,
            password_hash,
        }).await?;

        Ok(Self(record))
    }
}
