use async_trait::async_trait;

use super::support::{count_related, find_by_id, first_by_owner};
use crate::{
    batch_function::BatchFunction,
    error::BatchResult,
    model::{Event, Id, Image, ImageOwner, Relation},
    store::Collaborators,
};

pub struct EventsBatch;

#[async_trait]
impl BatchFunction<Id, Event> for EventsBatch {
    type Context = Collaborators;

    async fn load(event_ids: &[Id], context: &Collaborators) -> BatchResult<Event> {
        let events = context.store.events_by_ids(event_ids).await?;
        Ok(find_by_id(event_ids, events, |event| event.id, "event"))
    }
}

pub struct EventCoverPhotosBatch;

#[async_trait]
impl BatchFunction<Id, Image> for EventCoverPhotosBatch {
    type Context = Collaborators;

    async fn load(event_ids: &[Id], context: &Collaborators) -> BatchResult<Image> {
        let photos = context.store.cover_photos_by_owner_ids(ImageOwner::Event, event_ids).await?;
        Ok(first_by_owner(event_ids, photos, |photo| photo.event_id, "cover photo for event"))
    }
}

pub struct InterestedCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for InterestedCountBatch {
    type Context = Collaborators;

    async fn load(event_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::EventInterested, event_ids).await
    }
}

pub struct GoingCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for GoingCountBatch {
    type Context = Collaborators;

    async fn load(event_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::EventGoing, event_ids).await
    }
}
