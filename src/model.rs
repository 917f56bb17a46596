//! Records returned by the collaborating store.
//!
//! Only the fields the loaders need to partition or match on are modelled; everything else about
//! these entities lives with the services that own them.

use std::collections::HashMap;

pub type Id = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalAction {
    pub id: Id,
    pub action_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    Agreement,
    Reservations,
    StandAside,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: Id,
    pub proposal_id: Id,
    pub user_id: Id,
    pub vote_type: VoteType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Like {
    pub id: Id,
    pub post_id: Id,
    pub user_id: Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Normal,
    CoverPhoto,
    ProfilePicture,
}

/// The entity an image is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageOwner {
    Proposal,
    Post,
    Comment,
    Group,
    Event,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: Id,
    pub filename: String,
    pub kind: ImageKind,
    pub proposal_id: Option<Id>,
    pub post_id: Option<Id>,
    pub comment_id: Option<Id>,
    pub group_id: Option<Id>,
    pub event_id: Option<Id>,
    pub user_id: Option<Id>,
}

impl Image {
    /// A detached image; attach it with [`Image::owned_by`].
    pub fn new(id: Id, filename: impl Into<String>, kind: ImageKind) -> Self {
        Self {
            id,
            filename: filename.into(),
            kind,
            proposal_id: None,
            post_id: None,
            comment_id: None,
            group_id: None,
            event_id: None,
            user_id: None,
        }
    }

    pub fn owned_by(mut self, owner: ImageOwner, owner_id: Id) -> Self {
        *self.owner_slot(owner) = Some(owner_id);
        self
    }

    pub fn owner_id(&self, owner: ImageOwner) -> Option<Id> {
        match owner {
            ImageOwner::Proposal => self.proposal_id,
            ImageOwner::Post => self.post_id,
            ImageOwner::Comment => self.comment_id,
            ImageOwner::Group => self.group_id,
            ImageOwner::Event => self.event_id,
            ImageOwner::User => self.user_id,
        }
    }

    fn owner_slot(&mut self, owner: ImageOwner) -> &mut Option<Id> {
        match owner {
            ImageOwner::Proposal => &mut self.proposal_id,
            ImageOwner::Post => &mut self.post_id,
            ImageOwner::Comment => &mut self.comment_id,
            ImageOwner::Group => &mut self.group_id,
            ImageOwner::Event => &mut self.event_id,
            ImageOwner::User => &mut self.user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Id,
    pub name: String,
    pub group_id: Option<Id>,
}

/// Permissions a member holds within one group. A member without a role in the group holds none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPermissions {
    pub approve_member_requests: bool,
    pub create_events: bool,
    pub delete_group: bool,
    pub manage_comments: bool,
    pub manage_events: bool,
    pub manage_posts: bool,
    pub manage_roles: bool,
    pub manage_settings: bool,
    pub remove_members: bool,
    pub update_group: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerPermissions {
    pub ban_users: bool,
    pub manage_comments: bool,
    pub manage_events: bool,
    pub manage_posts: bool,
    pub manage_roles: bool,
    pub remove_groups: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPermissions {
    pub server_permissions: ServerPermissions,
    pub group_permissions: HashMap<Id, GroupPermissions>,
}

/// Relations that the count loaders aggregate per parent id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    ProposalVotes,
    ProposalComments,
    PostLikes,
    PostComments,
    GroupMembers,
    /// Member requests still awaiting a decision.
    GroupPendingMemberRequests,
    GroupRoleMembers,
    ServerRoleMembers,
    EventInterested,
    EventGoing,
}

/// Composite key for loaders whose answer depends on who is asking.
///
/// These loaders memoize on `target_id` alone, so every key issued within one request must carry
/// the same `viewer_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewerKey {
    pub target_id: Id,
    pub viewer_id: Id,
}

impl ViewerKey {
    pub fn new(target_id: Id, viewer_id: Id) -> Self {
        Self { target_id, viewer_id }
    }

    pub fn target(key: &ViewerKey) -> Id {
        key.target_id
    }
}
