use std::sync::Arc;

use futures::future;
use praxis_dataload::{
    memory::MemoryStore,
    model::{Group, Relation, User},
    Collaborators, LoaderConfig, RequestContext,
};

// Resolves a handful of fields the way a GraphQL executor would: concurrently, each through the
// request's loaders. The store log shows one query per loader.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter("praxis_dataload=debug").init();

    let mut store = MemoryStore::new();
    store
        .add_user(User { id: 1, name: "ada".to_owned() })
        .add_group(Group { id: 10, name: "gardeners".to_owned() })
        .add_group(Group { id: 11, name: "cyclists".to_owned() })
        .add_member(10, 1)
        .add_links(Relation::ProposalComments, 101, 4);
    let store = Arc::new(store);

    let collaborators = Collaborators::new(store.clone(), store.clone());
    let ctx = RequestContext::new(&collaborators, &LoaderConfig::load(), Some(1));

    let (comment_counts, member_counts, groups) = future::join3(
        future::join(
            ctx.loaders.proposal_comment_count.load(101),
            ctx.loaders.proposal_comment_count.load(102),
        ),
        ctx.loaders.group_member_count.load_many(vec![10, 11]),
        ctx.loaders.groups.load_many(vec![10, 11, 12]),
    )
    .await;

    assert_eq!(comment_counts, (Ok(4), Ok(0)));
    assert_eq!(member_counts, vec![Ok(1), Ok(0)]);
    for group in groups {
        match group {
            Ok(group) => println!("group {}: {}", group.id, group.name),
            Err(e) => println!("{e}"),
        }
    }
    for query in store.queries().await {
        println!("{} {:?}", query.operation, query.ids);
    }
}
