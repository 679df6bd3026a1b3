use chrono::{DateTime, SecondsFormat, Utc};
use juniper::{graphql_object, GraphQLInputObject, ID};

use crate::{
    api::{
        Context,
        err::{invalid_input, not_authorized, not_found, ApiResult},
    },
    auth::Caller,
    store::{EventRecord, NewEvent},
};
use super::user::User;


pub(crate) struct Event(EventRecord);

#[graphql_object(context = Context)]
impl Event {
    fn id(&self) -> ID {
        ID::from(self.0.id.clone())
    }

    fn title(&self) -> &str {
        &self.0.title
    }

    fn description(&self) -> &str {
        &self.0.description
    }

    fn price(&self) -> f64 {
        self.0.price
    }

    /// The event date as ISO 8601 string with millisecond precision, UTC.
    fn date(&self) -> String {
        self.0.date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The user that created this event. Resolved lazily; within one request,
    /// each distinct creator is looked up at most once.
    async fn creator(&self, context: &Context) -> ApiResult<User> {
        match context.load_user(&self.0.creator).await? {
            Some(user) => Ok(User::from_record(user)),
            None => Err(not_found!("user with id '{}' not found", self.0.creator)),
        }
    }
}

/// Input payload for `createEvent`.
#[derive(Debug, Clone, GraphQLInputObject)]
pub(crate) struct EventInput {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) price: f64,
    /// The event date as ISO 8601 / RFC 3339 string.
    pub(crate) date: String,
}

impl Event {
    pub(crate) fn from_record(record: EventRecord) -> Self {
        Self(record)
    }

    pub(crate) async fn load_all(context: &Context) -> ApiResult<Vec<Self>> {
        Ok(context.store.events().await?.into_iter().map(Self).collect())
    }

    pub(crate) async fn load_for_creator(creator: &str, context: &Context) -> ApiResult<Vec<Self>> {
        Ok(context.store.events_by_creator(creator).await?.into_iter().map(Self).collect())
    }

    pub(crate) async fn create(input: EventInput, context: &Context) -> ApiResult<Self> {
        if input.title.trim().is_empty() {
            return Err(invalid_input!("event title must not be empty"));
        }
        if input.description.trim().is_empty() {
            return Err(invalid_input!("event description must not be empty"));
        }
        let date = parse_date(&input.date)?;

        let creator = match &context.caller {
            Caller::User(id) => id.clone(),
            Caller::Anonymous => {
                return Err(not_authorized!("`createEvent` requires an identified caller"));
            }
        };

        // The creator has to exist before the event is written. Checking
        // afterwards could leave an orphaned event behind if the check fails.
        if context.load_user(&creator).await?.is_none() {
            return Err(not_found!("user with id '{creator}' does not exist"));
        }

        let record = context.store.insert_event(NewEvent {
            title: input.title,
            description: input.description,
            price: input.price,
            date,
            creator,
        }).await?;

        Ok(Self(record))
    }
}

fn parse_date(s: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| invalid_input!("invalid event date '{s}': {e}"))
}
