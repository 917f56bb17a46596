use async_trait::async_trait;

use super::support::{batch_viewer, count_related, for_viewer};
use crate::{
    batch_function::BatchFunction,
    error::BatchResult,
    model::{GroupPermissions, Id, Relation, ViewerKey},
    store::Collaborators,
};

pub struct GroupRoleMemberCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for GroupRoleMemberCountBatch {
    type Context = Collaborators;

    async fn load(role_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::GroupRoleMembers, role_ids).await
    }
}

pub struct ServerRoleMemberCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for ServerRoleMemberCountBatch {
    type Context = Collaborators;

    async fn load(role_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::ServerRoleMembers, role_ids).await
    }
}

/// The viewer's permissions in each group. Having no role in a group is a normal state and
/// yields the empty permission set instead of an error.
pub struct MyGroupPermissionsBatch;

#[async_trait]
impl BatchFunction<ViewerKey, GroupPermissions> for MyGroupPermissionsBatch {
    type Context = Collaborators;

    async fn load(keys: &[ViewerKey], context: &Collaborators) -> BatchResult<GroupPermissions> {
        let viewer_id = match batch_viewer(keys) {
            Some(viewer_id) => viewer_id,
            None => return Ok(Vec::new()),
        };
        let permissions = context.users.user_permissions(viewer_id).await?;
        Ok(keys
            .iter()
            .map(|key| {
                for_viewer(key, viewer_id, || {
                    Ok(permissions
                        .group_permissions
                        .get(&key.target_id)
                        .cloned()
                        .unwrap_or_default())
                })
            })
            .collect())
    }
}
