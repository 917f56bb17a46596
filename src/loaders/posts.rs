use async_trait::async_trait;

use super::support::{batch_viewer, count_related, for_viewer, group_by_owner};
use crate::{
    batch_function::BatchFunction,
    error::BatchResult,
    model::{Id, Image, ImageOwner, Like, Relation, ViewerKey},
    store::Collaborators,
};

/// Whether the viewer has liked each post.
pub struct IsPostLikedByMeBatch;

#[async_trait]
impl BatchFunction<ViewerKey, bool> for IsPostLikedByMeBatch {
    type Context = Collaborators;

    async fn load(keys: &[ViewerKey], context: &Collaborators) -> BatchResult<bool> {
        let viewer_id = match batch_viewer(keys) {
            Some(viewer_id) => viewer_id,
            None => return Ok(Vec::new()),
        };
        let post_ids = keys.iter().map(|key| key.target_id).collect::<Vec<_>>();
        let likes = context.store.likes_by_user_for_posts(viewer_id, &post_ids).await?;
        Ok(keys
            .iter()
            .map(|key| {
                for_viewer(key, viewer_id, || {
                    Ok(likes.iter().any(|like| like.post_id == key.target_id))
                })
            })
            .collect())
    }
}

pub struct PostImagesBatch;

#[async_trait]
impl BatchFunction<Id, Vec<Image>> for PostImagesBatch {
    type Context = Collaborators;

    async fn load(post_ids: &[Id], context: &Collaborators) -> BatchResult<Vec<Image>> {
        let images = context.store.images_by_owner_ids(ImageOwner::Post, post_ids).await?;
        Ok(group_by_owner(post_ids, images, |image| image.post_id))
    }
}

pub struct PostLikesBatch;

#[async_trait]
impl BatchFunction<Id, Vec<Like>> for PostLikesBatch {
    type Context = Collaborators;

    async fn load(post_ids: &[Id], context: &Collaborators) -> BatchResult<Vec<Like>> {
        let likes = context.store.likes_by_post_ids(post_ids).await?;
        Ok(group_by_owner(post_ids, likes, |like| Some(like.post_id)))
    }
}

pub struct PostLikeCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for PostLikeCountBatch {
    type Context = Collaborators;

    async fn load(post_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::PostLikes, post_ids).await
    }
}

pub struct PostCommentCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for PostCommentCountBatch {
    type Context = Collaborators;

    async fn load(post_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::PostComments, post_ids).await
    }
}

pub struct CommentImagesBatch;

#[async_trait]
impl BatchFunction<Id, Vec<Image>> for CommentImagesBatch {
    type Context = Collaborators;

    async fn load(comment_ids: &[Id], context: &Collaborators) -> BatchResult<Vec<Image>> {
        let images = context.store.images_by_owner_ids(ImageOwner::Comment, comment_ids).await?;
        Ok(group_by_owner(comment_ids, images, |image| image.comment_id))
    }
}
