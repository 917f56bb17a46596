use std::collections::HashMap;

use crate::{
    error::{LoadError, LoadResult},
    model::{Id, Relation, ViewerKey},
    store::Collaborators,
};

/// Matches each requested id to the fetched row carrying it, or a not-found error.
pub(super) fn find_by_id<T, F>(
    ids: &[Id],
    rows: Vec<T>,
    id_of: F,
    what: &'static str,
) -> Vec<LoadResult<T>>
where
    T: Clone,
    F: Fn(&T) -> Id,
{
    let by_id = rows.into_iter().map(|row| (id_of(&row), row)).collect::<HashMap<_, _>>();
    ids.iter()
        .map(|id| by_id.get(id).cloned().ok_or_else(|| LoadError::not_found(what, *id)))
        .collect()
}

/// Matches each owner id to the first fetched row it owns, or a not-found error.
pub(super) fn first_by_owner<T, F>(
    owner_ids: &[Id],
    rows: Vec<T>,
    owner_of: F,
    what: &'static str,
) -> Vec<LoadResult<T>>
where
    T: Clone,
    F: Fn(&T) -> Option<Id>,
{
    let mut by_owner: HashMap<Id, T> = HashMap::new();
    for row in rows {
        if let Some(owner_id) = owner_of(&row) {
            by_owner.entry(owner_id).or_insert(row);
        }
    }
    owner_ids
        .iter()
        .map(|id| by_owner.get(id).cloned().ok_or_else(|| LoadError::not_found(what, *id)))
        .collect()
}

/// Partitions rows by owning id. An owner without rows gets an empty collection.
pub(super) fn group_by_owner<T, F>(
    owner_ids: &[Id],
    rows: Vec<T>,
    owner_of: F,
) -> Vec<LoadResult<Vec<T>>>
where
    F: Fn(&T) -> Option<Id>,
{
    let mut by_owner: HashMap<Id, Vec<T>> = HashMap::new();
    for row in rows {
        if let Some(owner_id) = owner_of(&row) {
            by_owner.entry(owner_id).or_default().push(row);
        }
    }
    owner_ids.iter().map(|id| Ok(by_owner.remove(id).unwrap_or_default())).collect()
}

/// Runs one aggregate query for the relation. Parents missing from the aggregate have no related
/// rows and count as zero.
pub(super) async fn count_related(
    context: &Collaborators,
    relation: Relation,
    parent_ids: &[Id],
) -> Result<Vec<LoadResult<u64>>, LoadError> {
    let counts = context
        .store
        .count_related(relation, parent_ids)
        .await?
        .into_iter()
        .collect::<HashMap<Id, u64>>();
    tracing::trace!(?relation, ?counts);
    Ok(parent_ids.iter().map(|id| Ok(counts.get(id).copied().unwrap_or(0))).collect())
}

/// The viewer every key of a per-viewer batch is expected to share, taken from the first key.
pub(super) fn batch_viewer(keys: &[ViewerKey]) -> Option<Id> {
    keys.first().map(|key| key.viewer_id)
}

/// Answers `key` with `answer` when it belongs to the batch's viewer. A key issued for another
/// viewer is rejected rather than answered on the first viewer's behalf.
pub(super) fn for_viewer<V>(
    key: &ViewerKey,
    viewer_id: Id,
    answer: impl FnOnce() -> LoadResult<V>,
) -> LoadResult<V> {
    if key.viewer_id != viewer_id {
        tracing::warn!(
            ?key,
            expected_viewer = viewer_id,
            "per-viewer loader batched across viewers"
        );
        return Err(LoadError::MixedViewers { expected: viewer_id, actual: key.viewer_id });
    }
    answer()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: Id,
        owner: Option<Id>,
    }

    #[test]
    fn find_by_id_keeps_request_order() {
        let rows = vec![Row { id: 3, owner: None }, Row { id: 1, owner: None }];
        let found = find_by_id(&[1, 2, 3], rows, |row| row.id, "row");
        assert_eq!(found[0], Ok(Row { id: 1, owner: None }));
        assert_eq!(found[1], Err(LoadError::not_found("row", 2)));
        assert_eq!(found[2], Ok(Row { id: 3, owner: None }));
    }

    #[test]
    fn group_by_owner_gives_empty_for_missing_owner() {
        let rows = vec![
            Row { id: 1, owner: Some(10) },
            Row { id: 2, owner: Some(30) },
            Row { id: 3, owner: Some(10) },
            Row { id: 4, owner: None },
        ];
        let grouped = group_by_owner(&[10, 20, 30], rows, |row| row.owner);
        let ids = grouped
            .into_iter()
            .map(|rows| rows.unwrap().into_iter().map(|row| row.id).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![vec![1, 3], vec![], vec![2]]);
    }

    #[test]
    fn for_viewer_rejects_foreign_viewer() {
        let key = ViewerKey::new(5, 8);
        assert_eq!(
            for_viewer(&key, 9, || Ok(true)),
            Err(LoadError::MixedViewers { expected: 9, actual: 8 })
        );
        assert_eq!(for_viewer(&ViewerKey::new(5, 9), 9, || Ok(true)), Ok(true));
    }
}
