use juniper::graphql_object;

use super::{
    Context,
    err::ApiResult,
    model::{
        event::{Event, EventInput},
        user::{User, UserInput},
    },
};


/// The root mutation object.
pub(crate) struct Mutation;

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new event, owned by the requesting user. Fails if the
    /// request is anonymous or the requesting user does not exist.
    async fn create_event(event_input: EventInput, context: &Context) -> ApiResult<Event> {
        Event::create(event_input, context).await
    }

    /// Creates a new user with the given email and password. The password is
    /// stored only as one-way hash and never returned. Fails if a user with
    /// that email already exists.
    async fn create_user(user_input: UserInput, context: &Context) -> ApiResult<User> {
        User::create(user_input, context).await
    }
}
