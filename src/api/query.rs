use juniper::graphql_object;

use super::{
    Context,
    err::ApiResult,
    model::{event::Event, user::User},
};


/// The root query object.
pub(crate) struct Query;

#[graphql_object(context = Context)]
impl Query {
    /// Returns all events. The order is the store's natural return order and
    /// not guaranteed to be stable.
    async fn events(context: &Context) -> ApiResult<Vec<Event>> {
        Event::load_all(context).await
    }

    /// Returns all users. Password hashes are never included.
    async fn users(context: &Context) -> ApiResult<Vec<User>> {
        User::load_all(context).await
    }
}
