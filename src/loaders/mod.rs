//! The per-request loader bundle and the batch functions behind it.

mod events;
mod groups;
mod posts;
mod proposals;
mod roles;
mod support;
mod users;

pub use events::{EventCoverPhotosBatch, EventsBatch, GoingCountBatch, InterestedCountBatch};
pub use groups::{
    GroupCoverPhotosBatch, GroupMemberCountBatch, GroupMembersBatch, GroupsBatch,
    IsJoinedByMeBatch, MemberRequestCountBatch,
};
pub use posts::{
    CommentImagesBatch, IsPostLikedByMeBatch, PostCommentCountBatch, PostImagesBatch,
    PostLikeCountBatch, PostLikesBatch,
};
pub use proposals::{
    ProposalActionsBatch, ProposalCommentCountBatch, ProposalImagesBatch, ProposalVoteCountBatch,
    ProposalVotesBatch,
};
pub use roles::{GroupRoleMemberCountBatch, MyGroupPermissionsBatch, ServerRoleMemberCountBatch};
pub use users::{
    FollowerCountBatch, FollowingCountBatch, IsFollowedByMeBatch, ProfilePicturesBatch, UsersBatch,
};

use crate::{
    config::LoaderConfig,
    loader::Loader,
    model::{
        Event, Group, GroupPermissions, Id, Image, Like, ProposalAction, User, ViewerKey, Vote,
    },
    options::LoaderOptions,
    store::Collaborators,
};

/// Loader keyed by an entity id.
pub type IdLoader<V> = Loader<Id, V>;

/// Loader keyed by a [`ViewerKey`] and memoized on its target id.
pub type ViewerLoader<V> = Loader<ViewerKey, V, Id>;

/// One instance of every loader, built at the start of a request and dropped with it.
///
/// Nothing is shared between bundles, so memoized outcomes never outlive the request or leak to
/// another viewer.
pub struct Loaders {
    // Proposals & votes
    pub proposal_actions: IdLoader<ProposalAction>,
    pub proposal_images: IdLoader<Vec<Image>>,
    pub proposal_vote_count: IdLoader<u64>,
    pub proposal_votes: IdLoader<Vec<Vote>>,
    pub proposal_comment_count: IdLoader<u64>,

    // Posts
    pub is_post_liked_by_me: ViewerLoader<bool>,
    pub post_comment_count: IdLoader<u64>,
    pub post_images: IdLoader<Vec<Image>>,
    pub post_like_count: IdLoader<u64>,
    pub post_likes: IdLoader<Vec<Like>>,

    // Comments
    pub comment_images: IdLoader<Vec<Image>>,

    // Groups
    pub group_cover_photos: IdLoader<Image>,
    pub group_member_count: IdLoader<u64>,
    pub group_members: IdLoader<Vec<User>>,
    pub groups: IdLoader<Group>,
    pub is_joined_by_me: ViewerLoader<bool>,
    pub member_request_count: IdLoader<u64>,

    // Users
    pub follower_count: IdLoader<u64>,
    pub following_count: IdLoader<u64>,
    pub is_followed_by_me: ViewerLoader<bool>,
    pub profile_pictures: IdLoader<Image>,
    pub users: IdLoader<User>,

    // Roles & permissions
    pub group_role_member_count: IdLoader<u64>,
    pub server_role_member_count: IdLoader<u64>,
    pub my_group_permissions: ViewerLoader<GroupPermissions>,

    // Events
    pub event_cover_photos: IdLoader<Image>,
    pub interested_count: IdLoader<u64>,
    pub going_count: IdLoader<u64>,
    pub events: IdLoader<Event>,
}

impl Loaders {
    /// Builds the bundle. Spawns one idle worker per loader on the current tokio runtime; no
    /// query runs until the first load.
    pub fn new(collaborators: &Collaborators, config: &LoaderConfig) -> Self {
        let schedule = config.schedule();
        let by_id = || LoaderOptions::<Id, Id>::identity().schedule(schedule);
        let by_target =
            || LoaderOptions::<ViewerKey, Id>::projected(ViewerKey::target).schedule(schedule);
        let ctx = || collaborators.clone();

        tracing::debug!(?schedule, "building request loaders");
        Self {
            proposal_actions: Loader::with_options(ProposalActionsBatch, ctx(), by_id()),
            proposal_images: Loader::with_options(ProposalImagesBatch, ctx(), by_id()),
            proposal_vote_count: Loader::with_options(ProposalVoteCountBatch, ctx(), by_id()),
            proposal_votes: Loader::with_options(ProposalVotesBatch, ctx(), by_id()),
            proposal_comment_count: Loader::with_options(ProposalCommentCountBatch, ctx(), by_id()),

            is_post_liked_by_me: Loader::with_options(IsPostLikedByMeBatch, ctx(), by_target()),
            post_comment_count: Loader::with_options(PostCommentCountBatch, ctx(), by_id()),
            post_images: Loader::with_options(PostImagesBatch, ctx(), by_id()),
            post_like_count: Loader::with_options(PostLikeCountBatch, ctx(), by_id()),
            post_likes: Loader::with_options(PostLikesBatch, ctx(), by_id()),

            comment_images: Loader::with_options(CommentImagesBatch, ctx(), by_id()),

            group_cover_photos: Loader::with_options(GroupCoverPhotosBatch, ctx(), by_id()),
            group_member_count: Loader::with_options(GroupMemberCountBatch, ctx(), by_id()),
            group_members: Loader::with_options(GroupMembersBatch, ctx(), by_id()),
            groups: Loader::with_options(GroupsBatch, ctx(), by_id()),
            is_joined_by_me: Loader::with_options(IsJoinedByMeBatch, ctx(), by_target()),
            member_request_count: Loader::with_options(MemberRequestCountBatch, ctx(), by_id()),

            follower_count: Loader::with_options(FollowerCountBatch, ctx(), by_id()),
            following_count: Loader::with_options(FollowingCountBatch, ctx(), by_id()),
            is_followed_by_me: Loader::with_options(IsFollowedByMeBatch, ctx(), by_target()),
            profile_pictures: Loader::with_options(ProfilePicturesBatch, ctx(), by_id()),
            users: Loader::with_options(UsersBatch, ctx(), by_id()),

            group_role_member_count: Loader::with_options(
                GroupRoleMemberCountBatch,
                ctx(),
                by_id(),
            ),
            server_role_member_count: Loader::with_options(
                ServerRoleMemberCountBatch,
                ctx(),
                by_id(),
            ),
            my_group_permissions: Loader::with_options(MyGroupPermissionsBatch, ctx(), by_target()),

            event_cover_photos: Loader::with_options(EventCoverPhotosBatch, ctx(), by_id()),
            interested_count: Loader::with_options(InterestedCountBatch, ctx(), by_id()),
            going_count: Loader::with_options(GoingCountBatch, ctx(), by_id()),
            events: Loader::with_options(EventsBatch, ctx(), by_id()),
        }
    }
}
