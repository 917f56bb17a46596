use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::{LoadResult, StoreError},
    model::{
        Event, Group, Id, Image, ImageOwner, Like, ProposalAction, Relation, User,
        UserPermissions, ViewerKey, Vote,
    },
};

/// Batch read operations of the data access layer.
///
/// Every method answers for a whole id list in one round trip. Results are unordered and contain
/// only the rows that exist.
#[async_trait]
pub trait Store: Send + Sync {
    async fn proposal_actions_by_ids(&self, ids: &[Id]) -> Result<Vec<ProposalAction>, StoreError>;

    async fn votes_by_proposal_ids(&self, proposal_ids: &[Id]) -> Result<Vec<Vote>, StoreError>;

    /// Every image attached to one of the owners, of any kind.
    async fn images_by_owner_ids(
        &self,
        owner: ImageOwner,
        owner_ids: &[Id],
    ) -> Result<Vec<Image>, StoreError>;

    async fn cover_photos_by_owner_ids(
        &self,
        owner: ImageOwner,
        owner_ids: &[Id],
    ) -> Result<Vec<Image>, StoreError>;

    async fn likes_by_post_ids(&self, post_ids: &[Id]) -> Result<Vec<Like>, StoreError>;

    async fn likes_by_user_for_posts(
        &self,
        user_id: Id,
        post_ids: &[Id],
    ) -> Result<Vec<Like>, StoreError>;

    async fn groups_by_ids(&self, ids: &[Id]) -> Result<Vec<Group>, StoreError>;

    /// Each existing group together with its members.
    async fn group_members_by_group_ids(
        &self,
        group_ids: &[Id],
    ) -> Result<Vec<(Group, Vec<User>)>, StoreError>;

    async fn events_by_ids(&self, ids: &[Id]) -> Result<Vec<Event>, StoreError>;

    /// `(parent_id, count)` rows for the relation. Parents without related rows may be missing
    /// from the result.
    async fn count_related(
        &self,
        relation: Relation,
        parent_ids: &[Id],
    ) -> Result<Vec<(Id, u64)>, StoreError>;
}

/// Batch methods exposed by the users service. Results are positionally aligned with the input.
#[async_trait]
pub trait UsersService: Send + Sync {
    async fn follower_count_batch(&self, user_ids: &[Id])
        -> Result<Vec<LoadResult<u64>>, StoreError>;

    async fn following_count_batch(&self, user_ids: &[Id])
        -> Result<Vec<LoadResult<u64>>, StoreError>;

    async fn is_followed_by_me_batch(
        &self,
        keys: &[ViewerKey],
    ) -> Result<Vec<LoadResult<bool>>, StoreError>;

    async fn users_batch(&self, user_ids: &[Id]) -> Result<Vec<LoadResult<User>>, StoreError>;

    async fn profile_pictures_batch(
        &self,
        user_ids: &[Id],
    ) -> Result<Vec<LoadResult<Image>>, StoreError>;

    async fn user_permissions(&self, user_id: Id) -> Result<UserPermissions, StoreError>;
}

/// Handles to the collaborators every batch function may query. Cloning is cheap.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn Store>,
    pub users: Arc<dyn UsersService>,
}

impl Collaborators {
    pub fn new(store: Arc<dyn Store>, users: Arc<dyn UsersService>) -> Self {
        Self { store, users }
    }
}
