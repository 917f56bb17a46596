//! An in-memory collaborating store.
//!
//! Answers every batch read from plain vectors and records each query it receives, which makes it
//! suitable for wiring demos and for asserting how many round trips a request issued. Aggregate
//! counts follow inner-join semantics: parents without related rows are absent from the result.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::{LoadError, LoadResult, StoreError},
    model::{
        Event, Group, Id, Image, ImageKind, ImageOwner, Like, ProposalAction, Relation, User,
        UserPermissions, ViewerKey, Vote,
    },
    store::{Store, UsersService},
};

/// One query received by the [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub operation: String,
    pub ids: Vec<Id>,
}

impl QueryRecord {
    fn new(operation: impl Into<String>, ids: &[Id]) -> Self {
        Self { operation: operation.into(), ids: ids.to_vec() }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: Vec<User>,
    groups: Vec<Group>,
    memberships: Vec<(Id, Id)>,
    proposal_actions: Vec<ProposalAction>,
    votes: Vec<Vote>,
    likes: Vec<Like>,
    images: Vec<Image>,
    events: Vec<Event>,
    follows: Vec<(Id, Id)>,
    /// Rows of relations that have no record type of their own, as `(relation, parent_id)`.
    links: Vec<(Relation, Id)>,
    permissions: HashMap<Id, UserPermissions>,
    unavailable: AtomicBool,
    queries: Mutex<Vec<QueryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user: User) -> &mut Self {
        self.users.push(user);
        self
    }

    pub fn add_group(&mut self, group: Group) -> &mut Self {
        self.groups.push(group);
        self
    }

    pub fn add_member(&mut self, group_id: Id, user_id: Id) -> &mut Self {
        self.memberships.push((group_id, user_id));
        self
    }

    pub fn add_proposal_action(&mut self, action: ProposalAction) -> &mut Self {
        self.proposal_actions.push(action);
        self
    }

    pub fn add_vote(&mut self, vote: Vote) -> &mut Self {
        self.votes.push(vote);
        self
    }

    pub fn add_like(&mut self, like: Like) -> &mut Self {
        self.likes.push(like);
        self
    }

    pub fn add_image(&mut self, image: Image) -> &mut Self {
        self.images.push(image);
        self
    }

    pub fn add_event(&mut self, event: Event) -> &mut Self {
        self.events.push(event);
        self
    }

    pub fn add_follow(&mut self, follower_id: Id, followed_id: Id) -> &mut Self {
        self.follows.push((follower_id, followed_id));
        self
    }

    /// Adds `count` related rows under `parent_id`, e.g. comments on a post or going attendees of
    /// an event.
    pub fn add_links(&mut self, relation: Relation, parent_id: Id, count: usize) -> &mut Self {
        self.links.extend(std::iter::repeat((relation, parent_id)).take(count));
        self
    }

    pub fn set_permissions(&mut self, user_id: Id, permissions: UserPermissions) -> &mut Self {
        self.permissions.insert(user_id, permissions);
        self
    }

    /// While set, every query fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Queries received so far, oldest first.
    pub async fn queries(&self) -> Vec<QueryRecord> {
        self.queries.lock().await.clone()
    }

    /// Queries received so far whose operation starts with `prefix`.
    pub async fn queries_for(&self, prefix: &str) -> Vec<QueryRecord> {
        self.queries
            .lock()
            .await
            .iter()
            .filter(|query| query.operation.starts_with(prefix))
            .cloned()
            .collect()
    }

    async fn record(&self, query: QueryRecord) -> Result<(), StoreError> {
        tracing::trace!(?query, "memory store query");
        self.queries.lock().await.push(query);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_owned()));
        }
        Ok(())
    }

    fn images_of(&self, owner: ImageOwner, owner_ids: &[Id]) -> impl Iterator<Item = &Image> {
        let owner_ids = owner_ids.to_vec();
        self.images
            .iter()
            .filter(move |image| image.owner_id(owner).map_or(false, |id| owner_ids.contains(&id)))
    }

    fn related_parents(&self, relation: Relation) -> Vec<Id> {
        match relation {
            Relation::ProposalVotes => self.votes.iter().map(|vote| vote.proposal_id).collect(),
            Relation::PostLikes => self.likes.iter().map(|like| like.post_id).collect(),
            Relation::GroupMembers => {
                self.memberships.iter().map(|(group_id, _)| *group_id).collect()
            }
            other => self
                .links
                .iter()
                .filter(|(relation, _)| *relation == other)
                .map(|(_, parent_id)| *parent_id)
                .collect(),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn proposal_actions_by_ids(&self, ids: &[Id]) -> Result<Vec<ProposalAction>, StoreError> {
        self.record(QueryRecord::new("proposal_actions_by_ids", ids)).await?;
        Ok(self
            .proposal_actions
            .iter()
            .filter(|action| ids.contains(&action.id))
            .cloned()
            .collect())
    }

    async fn votes_by_proposal_ids(&self, proposal_ids: &[Id]) -> Result<Vec<Vote>, StoreError> {
        self.record(QueryRecord::new("votes_by_proposal_ids", proposal_ids)).await?;
        Ok(self
            .votes
            .iter()
            .filter(|vote| proposal_ids.contains(&vote.proposal_id))
            .cloned()
            .collect())
    }

    async fn images_by_owner_ids(
        &self,
        owner: ImageOwner,
        owner_ids: &[Id],
    ) -> Result<Vec<Image>, StoreError> {
        self.record(QueryRecord::new(format!("images_by_owner_ids({owner:?})"), owner_ids)).await?;
        Ok(self.images_of(owner, owner_ids).cloned().collect())
    }

    async fn cover_photos_by_owner_ids(
        &self,
        owner: ImageOwner,
        owner_ids: &[Id],
    ) -> Result<Vec<Image>, StoreError> {
        self.record(QueryRecord::new(format!("cover_photos_by_owner_ids({owner:?})"), owner_ids))
            .await?;
        Ok(self
            .images_of(owner, owner_ids)
            .filter(|image| image.kind == ImageKind::CoverPhoto)
            .cloned()
            .collect())
    }

    async fn likes_by_post_ids(&self, post_ids: &[Id]) -> Result<Vec<Like>, StoreError> {
        self.record(QueryRecord::new("likes_by_post_ids", post_ids)).await?;
        Ok(self.likes.iter().filter(|like| post_ids.contains(&like.post_id)).cloned().collect())
    }

    async fn likes_by_user_for_posts(
        &self,
        user_id: Id,
        post_ids: &[Id],
    ) -> Result<Vec<Like>, StoreError> {
        self.record(QueryRecord::new(format!("likes_by_user_for_posts({user_id})"), post_ids))
            .await?;
        Ok(self
            .likes
            .iter()
            .filter(|like| like.user_id == user_id && post_ids.contains(&like.post_id))
            .cloned()
            .collect())
    }

    async fn groups_by_ids(&self, ids: &[Id]) -> Result<Vec<Group>, StoreError> {
        self.record(QueryRecord::new("groups_by_ids", ids)).await?;
        Ok(self.groups.iter().filter(|group| ids.contains(&group.id)).cloned().collect())
    }

    async fn group_members_by_group_ids(
        &self,
        group_ids: &[Id],
    ) -> Result<Vec<(Group, Vec<User>)>, StoreError> {
        self.record(QueryRecord::new("group_members_by_group_ids", group_ids)).await?;
        Ok(self
            .groups
            .iter()
            .filter(|group| group_ids.contains(&group.id))
            .map(|group| {
                let members = self
                    .memberships
                    .iter()
                    .filter(|(group_id, _)| *group_id == group.id)
                    .filter_map(|(_, user_id)| self.users.iter().find(|user| user.id == *user_id))
                    .cloned()
                    .collect();
                (group.clone(), members)
            })
            .collect())
    }

    async fn events_by_ids(&self, ids: &[Id]) -> Result<Vec<Event>, StoreError> {
        self.record(QueryRecord::new("events_by_ids", ids)).await?;
        Ok(self.events.iter().filter(|event| ids.contains(&event.id)).cloned().collect())
    }

    async fn count_related(
        &self,
        relation: Relation,
        parent_ids: &[Id],
    ) -> Result<Vec<(Id, u64)>, StoreError> {
        self.record(QueryRecord::new(format!("count_related({relation:?})"), parent_ids)).await?;
        let mut counts: Vec<(Id, u64)> = Vec::new();
        for parent_id in self.related_parents(relation) {
            if !parent_ids.contains(&parent_id) {
                continue;
            }
            match counts.iter_mut().find(|(id, _)| *id == parent_id) {
                Some((_, count)) => *count += 1,
                None => counts.push((parent_id, 1)),
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl UsersService for MemoryStore {
    async fn follower_count_batch(
        &self,
        user_ids: &[Id],
    ) -> Result<Vec<LoadResult<u64>>, StoreError> {
        self.record(QueryRecord::new("follower_count_batch", user_ids)).await?;
        Ok(user_ids
            .iter()
            .map(|id| Ok(self.follows.iter().filter(|(_, followed)| followed == id).count() as u64))
            .collect())
    }

    async fn following_count_batch(
        &self,
        user_ids: &[Id],
    ) -> Result<Vec<LoadResult<u64>>, StoreError> {
        self.record(QueryRecord::new("following_count_batch", user_ids)).await?;
        Ok(user_ids
            .iter()
            .map(|id| Ok(self.follows.iter().filter(|(follower, _)| follower == id).count() as u64))
            .collect())
    }

    async fn is_followed_by_me_batch(
        &self,
        keys: &[ViewerKey],
    ) -> Result<Vec<LoadResult<bool>>, StoreError> {
        let targets = keys.iter().map(|key| key.target_id).collect::<Vec<_>>();
        self.record(QueryRecord::new("is_followed_by_me_batch", &targets)).await?;
        Ok(keys
            .iter()
            .map(|key| Ok(self.follows.contains(&(key.viewer_id, key.target_id))))
            .collect())
    }

    async fn users_batch(&self, user_ids: &[Id]) -> Result<Vec<LoadResult<User>>, StoreError> {
        self.record(QueryRecord::new("users_batch", user_ids)).await?;
        Ok(user_ids
            .iter()
            .map(|id| {
                self.users
                    .iter()
                    .find(|user| user.id == *id)
                    .cloned()
                    .ok_or_else(|| LoadError::not_found("user", *id))
            })
            .collect())
    }

    async fn profile_pictures_batch(
        &self,
        user_ids: &[Id],
    ) -> Result<Vec<LoadResult<Image>>, StoreError> {
        self.record(QueryRecord::new("profile_pictures_batch", user_ids)).await?;
        Ok(user_ids
            .iter()
            .map(|id| {
                self.images
                    .iter()
                    .find(|image| {
                        image.kind == ImageKind::ProfilePicture && image.user_id == Some(*id)
                    })
                    .cloned()
                    .ok_or_else(|| LoadError::not_found("profile picture for user", *id))
            })
            .collect())
    }

    async fn user_permissions(&self, user_id: Id) -> Result<UserPermissions, StoreError> {
        self.record(QueryRecord::new("user_permissions", &[user_id])).await?;
        Ok(self.permissions.get(&user_id).cloned().unwrap_or_default())
    }
}
