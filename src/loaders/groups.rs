use async_trait::async_trait;

use super::support::{batch_viewer, count_related, find_by_id, first_by_owner, for_viewer};
use crate::{
    batch_function::BatchFunction,
    error::{BatchResult, LoadError},
    model::{Group, Id, Image, ImageOwner, Relation, User, ViewerKey},
    store::Collaborators,
};

pub struct GroupsBatch;

#[async_trait]
impl BatchFunction<Id, Group> for GroupsBatch {
    type Context = Collaborators;

    async fn load(group_ids: &[Id], context: &Collaborators) -> BatchResult<Group> {
        let groups = context.store.groups_by_ids(group_ids).await?;
        Ok(find_by_id(group_ids, groups, |group| group.id, "group"))
    }
}

pub struct GroupCoverPhotosBatch;

#[async_trait]
impl BatchFunction<Id, Image> for GroupCoverPhotosBatch {
    type Context = Collaborators;

    async fn load(group_ids: &[Id], context: &Collaborators) -> BatchResult<Image> {
        let photos = context.store.cover_photos_by_owner_ids(ImageOwner::Group, group_ids).await?;
        Ok(first_by_owner(group_ids, photos, |photo| photo.group_id, "cover photo for group"))
    }
}

pub struct GroupMemberCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for GroupMemberCountBatch {
    type Context = Collaborators;

    async fn load(group_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::GroupMembers, group_ids).await
    }
}

/// Pending member requests per group.
pub struct MemberRequestCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for MemberRequestCountBatch {
    type Context = Collaborators;

    async fn load(group_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::GroupPendingMemberRequests, group_ids).await
    }
}

/// Members of each group. Unlike the other has-many loaders the group itself must exist.
pub struct GroupMembersBatch;

#[async_trait]
impl BatchFunction<Id, Vec<User>> for GroupMembersBatch {
    type Context = Collaborators;

    async fn load(group_ids: &[Id], context: &Collaborators) -> BatchResult<Vec<User>> {
        let groups = context.store.group_members_by_group_ids(group_ids).await?;
        let members = find_by_id(group_ids, groups, |(group, _)| group.id, "group members");
        Ok(members.into_iter().map(|found| found.map(|(_, members)| members)).collect())
    }
}

pub struct IsJoinedByMeBatch;

#[async_trait]
impl BatchFunction<ViewerKey, bool> for IsJoinedByMeBatch {
    type Context = Collaborators;

    async fn load(keys: &[ViewerKey], context: &Collaborators) -> BatchResult<bool> {
        let viewer_id = match batch_viewer(keys) {
            Some(viewer_id) => viewer_id,
            None => return Ok(Vec::new()),
        };
        let group_ids = keys.iter().map(|key| key.target_id).collect::<Vec<_>>();
        let groups = context.store.group_members_by_group_ids(&group_ids).await?;
        Ok(keys
            .iter()
            .map(|key| {
                for_viewer(key, viewer_id, || {
                    groups
                        .iter()
                        .find(|(group, _)| group.id == key.target_id)
                        .map(|(_, members)| members.iter().any(|member| member.id == viewer_id))
                        .ok_or_else(|| LoadError::not_found("group", key.target_id))
                })
            })
            .collect())
    }
}
