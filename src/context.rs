use crate::{
    config::LoaderConfig,
    loaders::Loaders,
    model::{Id, ViewerKey},
    store::Collaborators,
};

/// State handed to every field resolver of one request.
pub struct RequestContext {
    pub loaders: Loaders,
    /// The authenticated user, if any. Per-viewer loaders are only usable when this is set.
    pub viewer_id: Option<Id>,
}

impl RequestContext {
    pub fn new(
        collaborators: &Collaborators,
        config: &LoaderConfig,
        viewer_id: Option<Id>,
    ) -> Self {
        tracing::debug!(?viewer_id, "new request context");
        Self { loaders: Loaders::new(collaborators, config), viewer_id }
    }

    /// Key for a per-viewer loader, addressed on behalf of this request's viewer.
    pub fn viewer_key(&self, target_id: Id) -> Option<ViewerKey> {
        self.viewer_id.map(|viewer_id| ViewerKey::new(target_id, viewer_id))
    }
}
