use std::collections::HashMap;
use std::sync::Arc;

use futures::future;
use praxis_dataload::{
    memory::{MemoryStore, QueryRecord},
    model::{
        Event, Group, GroupPermissions, Image, ImageKind, ImageOwner, Like, ProposalAction,
        Relation, User, UserPermissions, ViewerKey, Vote, VoteType,
    },
    Collaborators, LoadError, LoaderConfig, RequestContext, StoreError,
};

const VIEWER: i64 = 9;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn user(id: i64, name: &str) -> User {
    User { id, name: name.to_owned() }
}

fn group(id: i64, name: &str) -> Group {
    Group { id, name: name.to_owned() }
}

fn fixture() -> Arc<MemoryStore> {
    let mut store = MemoryStore::new();
    store
        .add_user(user(VIEWER, "viewer"))
        .add_user(user(2, "ada"))
        .add_user(user(3, "grace"))
        .add_group(group(1, "gardeners"))
        .add_group(group(2, "cyclists"))
        .add_member(1, VIEWER)
        .add_member(1, 2)
        .add_proposal_action(ProposalAction { id: 40, action_type: "change_name".to_owned() })
        .add_vote(Vote { id: 1, proposal_id: 101, user_id: 2, vote_type: VoteType::Agreement })
        .add_vote(Vote { id: 2, proposal_id: 101, user_id: 3, vote_type: VoteType::Block })
        .add_like(Like { id: 1, post_id: 5, user_id: VIEWER })
        .add_like(Like { id: 2, post_id: 5, user_id: 2 })
        .add_like(Like { id: 3, post_id: 6, user_id: 2 })
        .add_image(Image::new(1, "a.png", ImageKind::Normal).owned_by(ImageOwner::Comment, 70))
        .add_image(Image::new(2, "b.png", ImageKind::Normal).owned_by(ImageOwner::Comment, 70))
        .add_image(Image::new(3, "cover.png", ImageKind::CoverPhoto).owned_by(ImageOwner::Group, 1))
        .add_image(Image::new(4, "me.png", ImageKind::ProfilePicture).owned_by(ImageOwner::User, 2))
        .add_event(Event { id: 30, name: "potluck".to_owned(), group_id: Some(1) })
        .add_follow(VIEWER, 2)
        .add_follow(3, 2)
        .add_links(Relation::ProposalComments, 101, 3)
        .add_links(Relation::EventGoing, 30, 2)
        .add_links(Relation::GroupPendingMemberRequests, 2, 1);
    let mut group_permissions = HashMap::new();
    group_permissions.insert(1, GroupPermissions { manage_posts: true, ..Default::default() });
    store.set_permissions(
        VIEWER,
        UserPermissions { group_permissions, ..Default::default() },
    );
    Arc::new(store)
}

fn request(store: &Arc<MemoryStore>) -> RequestContext {
    init_tracing();
    let collaborators = Collaborators::new(store.clone(), store.clone());
    RequestContext::new(&collaborators, &LoaderConfig::default(), Some(VIEWER))
}

#[tokio::test]
async fn comment_counts_with_zero_comment_proposal() {
    let store = fixture();
    let ctx = request(&store);
    let loader = &ctx.loaders.proposal_comment_count;

    let (first, second) = future::join(loader.load(101), loader.load(102)).await;
    assert_eq!(first, Ok(3));
    assert_eq!(second, Ok(0));
    assert_eq!(
        store.queries().await,
        vec![QueryRecord { operation: "count_related(ProposalComments)".to_owned(), ids: vec![101, 102] }]
    );
}

#[tokio::test]
async fn counts_dropped_by_aggregate_resolve_to_zero() {
    let store = fixture();
    let ctx = request(&store);

    let counts = ctx.loaders.proposal_vote_count.load_many(vec![101, 102, 103]).await;
    assert_eq!(counts, vec![Ok(2), Ok(0), Ok(0)]);
    assert_eq!(ctx.loaders.post_like_count.load_many(vec![5, 6, 7]).await, vec![Ok(2), Ok(1), Ok(0)]);
    assert_eq!(ctx.loaders.going_count.load(30).await, Ok(2));
    assert_eq!(ctx.loaders.interested_count.load(30).await, Ok(0));
    assert_eq!(ctx.loaders.member_request_count.load_many(vec![1, 2]).await, vec![Ok(0), Ok(1)]);
    assert_eq!(ctx.loaders.group_member_count.load(1).await, Ok(2));
    assert_eq!(ctx.loaders.group_role_member_count.load(4).await, Ok(0));
    assert_eq!(ctx.loaders.server_role_member_count.load(4).await, Ok(0));
    assert_eq!(ctx.loaders.post_comment_count.load(5).await, Ok(0));
}

#[tokio::test]
async fn memoized_counts_do_not_query_again() {
    let store = fixture();
    let ctx = request(&store);

    assert_eq!(ctx.loaders.proposal_comment_count.load(101).await, Ok(3));
    assert_eq!(ctx.loaders.proposal_comment_count.load(101).await, Ok(3));
    assert_eq!(store.queries_for("count_related").await.len(), 1);
}

#[tokio::test]
async fn id_lookups_report_missing_entities() {
    let store = fixture();
    let ctx = request(&store);

    let (found, missing) = future::join(ctx.loaders.groups.load(1), ctx.loaders.groups.load(9)).await;
    assert_eq!(found, Ok(group(1, "gardeners")));
    assert_eq!(missing.unwrap_err().to_string(), "could not load group for id: 9");

    assert_eq!(ctx.loaders.events.load(30).await.map(|event| event.name), Ok("potluck".to_owned()));
    assert_eq!(
        ctx.loaders.proposal_actions.load(41).await,
        Err(LoadError::not_found("proposal action", 41))
    );
    assert_eq!(ctx.loaders.proposal_actions.load(40).await.map(|action| action.id), Ok(40));
}

#[tokio::test]
async fn has_many_loaders_yield_empty_collections() {
    let store = fixture();
    let ctx = request(&store);

    let images = ctx.loaders.comment_images.load_many(vec![70, 71]).await;
    let ids = images
        .into_iter()
        .map(|images| images.unwrap().into_iter().map(|image| image.id).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![vec![1, 2], vec![]]);

    assert_eq!(ctx.loaders.proposal_votes.load(101).await.map(|votes| votes.len()), Ok(2));
    assert_eq!(ctx.loaders.proposal_votes.load(102).await, Ok(vec![]));
    assert_eq!(ctx.loaders.proposal_images.load(101).await, Ok(vec![]));
    assert_eq!(ctx.loaders.post_images.load(5).await, Ok(vec![]));
    assert_eq!(ctx.loaders.post_likes.load(6).await.map(|likes| likes.len()), Ok(1));
}

#[tokio::test]
async fn group_members_require_the_group() {
    let store = fixture();
    let ctx = request(&store);

    let (gardeners, cyclists, missing) = future::join3(
        ctx.loaders.group_members.load(1),
        ctx.loaders.group_members.load(2),
        ctx.loaders.group_members.load(3),
    )
    .await;
    assert_eq!(gardeners.map(|members| members.len()), Ok(2));
    assert_eq!(cyclists, Ok(vec![]));
    assert_eq!(missing, Err(LoadError::not_found("group members", 3)));
    assert_eq!(store.queries_for("group_members_by_group_ids").await.len(), 1);
}

#[tokio::test]
async fn cover_photos() {
    let store = fixture();
    let ctx = request(&store);

    assert_eq!(ctx.loaders.group_cover_photos.load(1).await.map(|image| image.id), Ok(3));
    assert_eq!(
        ctx.loaders.group_cover_photos.load(2).await,
        Err(LoadError::not_found("cover photo for group", 2))
    );
    assert_eq!(
        ctx.loaders.event_cover_photos.load(30).await,
        Err(LoadError::not_found("cover photo for event", 30))
    );
}

#[tokio::test]
async fn per_viewer_keys_share_one_fetch() {
    let store = fixture();
    let ctx = request(&store);
    let key = ctx.viewer_key(5).unwrap();

    let (first, second, other) = future::join3(
        ctx.loaders.is_post_liked_by_me.load(key),
        ctx.loaders.is_post_liked_by_me.load(key),
        ctx.loaders.is_post_liked_by_me.load(ViewerKey::new(6, VIEWER)),
    )
    .await;
    assert_eq!(first, Ok(true));
    assert_eq!(second, Ok(true));
    assert_eq!(other, Ok(false));
    assert_eq!(
        store.queries_for("likes_by_user_for_posts").await,
        vec![QueryRecord { operation: "likes_by_user_for_posts(9)".to_owned(), ids: vec![5, 6] }]
    );
}

#[tokio::test]
async fn per_viewer_batch_rejects_other_viewers() {
    let store = fixture();
    let ctx = request(&store);

    let (mine, theirs) = future::join(
        ctx.loaders.is_joined_by_me.load(ViewerKey::new(1, VIEWER)),
        ctx.loaders.is_joined_by_me.load(ViewerKey::new(2, 2)),
    )
    .await;
    assert_eq!(mine, Ok(true));
    assert_eq!(theirs, Err(LoadError::MixedViewers { expected: VIEWER, actual: 2 }));
}

#[tokio::test]
async fn same_target_for_two_viewers_collapses_onto_the_first() {
    let store = fixture();
    let ctx = request(&store);

    let (mine, theirs) = future::join(
        ctx.loaders.is_post_liked_by_me.load(ViewerKey::new(5, VIEWER)),
        ctx.loaders.is_post_liked_by_me.load(ViewerKey::new(5, 2)),
    )
    .await;
    // Memoized on the target id: the second viewer gets the first viewer's answer.
    assert_eq!(mine, Ok(true));
    assert_eq!(theirs, Ok(true));
    assert_eq!(
        store.queries_for("likes_by_user_for_posts").await,
        vec![QueryRecord { operation: "likes_by_user_for_posts(9)".to_owned(), ids: vec![5] }]
    );
}

#[tokio::test]
async fn membership_and_permissions() {
    let store = fixture();
    let ctx = request(&store);

    let joined = ctx
        .loaders
        .is_joined_by_me
        .load_many(vec![ViewerKey::new(1, VIEWER), ViewerKey::new(2, VIEWER), ViewerKey::new(8, VIEWER)])
        .await;
    assert_eq!(joined, vec![Ok(true), Ok(false), Err(LoadError::not_found("group", 8))]);

    let permissions = ctx
        .loaders
        .my_group_permissions
        .load_many(vec![ViewerKey::new(1, VIEWER), ViewerKey::new(2, VIEWER)])
        .await;
    assert_eq!(
        permissions,
        vec![
            Ok(GroupPermissions { manage_posts: true, ..Default::default() }),
            Ok(GroupPermissions::default()),
        ]
    );
    assert_eq!(store.queries_for("user_permissions").await.len(), 1);
}

#[tokio::test]
async fn delegated_user_loaders() {
    let store = fixture();
    let ctx = request(&store);

    let (followers, following, followed, me) = future::join4(
        ctx.loaders.follower_count.load_many(vec![2, 3]),
        ctx.loaders.following_count.load(VIEWER),
        ctx.loaders.is_followed_by_me.load(ViewerKey::new(2, VIEWER)),
        ctx.loaders.users.load(VIEWER),
    )
    .await;
    assert_eq!(followers, vec![Ok(2), Ok(0)]);
    assert_eq!(following, Ok(1));
    assert_eq!(followed, Ok(true));
    assert_eq!(me, Ok(user(VIEWER, "viewer")));

    assert_eq!(ctx.loaders.users.load(77).await, Err(LoadError::not_found("user", 77)));
    assert_eq!(ctx.loaders.profile_pictures.load(2).await.map(|image| image.id), Ok(4));
    assert_eq!(
        ctx.loaders.profile_pictures.load(3).await,
        Err(LoadError::not_found("profile picture for user", 3))
    );
}

#[tokio::test]
async fn unavailable_store_rejects_the_window() {
    let store = fixture();
    let ctx = request(&store);
    store.set_unavailable(true);

    let (first, second) =
        future::join(ctx.loaders.groups.load(1), ctx.loaders.groups.load(2)).await;
    let expected = Err(LoadError::Store(StoreError::Unavailable(
        "memory store switched off".to_owned(),
    )));
    assert_eq!(first, expected);
    assert_eq!(second, expected);

    store.set_unavailable(false);
    assert_eq!(ctx.loaders.groups.load(1).await, Ok(group(1, "gardeners")));
}

#[tokio::test]
async fn requests_do_not_share_memoized_outcomes() {
    let store = fixture();

    let first = request(&store);
    assert_eq!(first.loaders.groups.load(1).await, Ok(group(1, "gardeners")));
    drop(first);

    let second = request(&store);
    assert_eq!(second.loaders.groups.load(1).await, Ok(group(1, "gardeners")));
    assert_eq!(store.queries_for("groups_by_ids").await.len(), 2);
}

#[tokio::test]
async fn building_the_bundle_issues_no_queries() {
    let store = fixture();
    let ctx = request(&store);
    tokio::task::yield_now().await;
    assert!(store.queries().await.is_empty());

    let anonymous = RequestContext::new(
        &Collaborators::new(store.clone(), store.clone()),
        &LoaderConfig::default(),
        None,
    );
    assert_eq!(anonymous.viewer_key(5), None);
    assert_eq!(ctx.viewer_key(5), Some(ViewerKey::new(5, VIEWER)));
}
