//! Loaders that only add batching and memoization on top of the users service's own batch
//! methods.

use async_trait::async_trait;

use crate::{
    batch_function::BatchFunction,
    error::BatchResult,
    model::{Id, Image, User, ViewerKey},
    store::Collaborators,
};

pub struct FollowerCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for FollowerCountBatch {
    type Context = Collaborators;

    async fn load(user_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        Ok(context.users.follower_count_batch(user_ids).await?)
    }
}

pub struct FollowingCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for FollowingCountBatch {
    type Context = Collaborators;

    async fn load(user_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        Ok(context.users.following_count_batch(user_ids).await?)
    }
}

pub struct IsFollowedByMeBatch;

#[async_trait]
impl BatchFunction<ViewerKey, bool> for IsFollowedByMeBatch {
    type Context = Collaborators;

    async fn load(keys: &[ViewerKey], context: &Collaborators) -> BatchResult<bool> {
        Ok(context.users.is_followed_by_me_batch(keys).await?)
    }
}

pub struct UsersBatch;

#[async_trait]
impl BatchFunction<Id, User> for UsersBatch {
    type Context = Collaborators;

    async fn load(user_ids: &[Id], context: &Collaborators) -> BatchResult<User> {
        Ok(context.users.users_batch(user_ids).await?)
    }
}

pub struct ProfilePicturesBatch;

#[async_trait]
impl BatchFunction<Id, Image> for ProfilePicturesBatch {
    type Context = Collaborators;

    async fn load(user_ids: &[Id], context: &Collaborators) -> BatchResult<Image> {
        Ok(context.users.profile_pictures_batch(user_ids).await?)
    }
}
