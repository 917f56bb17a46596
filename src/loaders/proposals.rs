use async_trait::async_trait;

use super::support::{count_related, find_by_id, group_by_owner};
use crate::{
    batch_function::BatchFunction,
    error::BatchResult,
    model::{Id, Image, ImageOwner, ProposalAction, Relation, Vote},
    store::Collaborators,
};

pub struct ProposalActionsBatch;

#[async_trait]
impl BatchFunction<Id, ProposalAction> for ProposalActionsBatch {
    type Context = Collaborators;

    async fn load(ids: &[Id], context: &Collaborators) -> BatchResult<ProposalAction> {
        let actions = context.store.proposal_actions_by_ids(ids).await?;
        Ok(find_by_id(ids, actions, |action| action.id, "proposal action"))
    }
}

pub struct ProposalImagesBatch;

#[async_trait]
impl BatchFunction<Id, Vec<Image>> for ProposalImagesBatch {
    type Context = Collaborators;

    async fn load(proposal_ids: &[Id], context: &Collaborators) -> BatchResult<Vec<Image>> {
        let images = context.store.images_by_owner_ids(ImageOwner::Proposal, proposal_ids).await?;
        Ok(group_by_owner(proposal_ids, images, |image| image.proposal_id))
    }
}

pub struct ProposalVotesBatch;

#[async_trait]
impl BatchFunction<Id, Vec<Vote>> for ProposalVotesBatch {
    type Context = Collaborators;

    async fn load(proposal_ids: &[Id], context: &Collaborators) -> BatchResult<Vec<Vote>> {
        let votes = context.store.votes_by_proposal_ids(proposal_ids).await?;
        Ok(group_by_owner(proposal_ids, votes, |vote| Some(vote.proposal_id)))
    }
}

pub struct ProposalVoteCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for ProposalVoteCountBatch {
    type Context = Collaborators;

    async fn load(proposal_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::ProposalVotes, proposal_ids).await
    }
}

pub struct ProposalCommentCountBatch;

#[async_trait]
impl BatchFunction<Id, u64> for ProposalCommentCountBatch {
    type Context = Collaborators;

    async fn load(proposal_ids: &[Id], context: &Collaborators) -> BatchResult<u64> {
        count_related(context, Relation::ProposalComments, proposal_ids).await
    }
}
