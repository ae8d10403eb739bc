use async_trait::async_trait;

use crate::config::{Manifest, ViewerConfig};
use crate::viewers::ViewerDescriptor;

/// Chooses and builds a viewer for a single (non-ensemble) manifest.
#[async_trait]
pub trait ViewerSelector: Send + Sync {
    /// Try the known viewer types in priority order.
    ///
    /// Returns the descriptor built by the first type that accepts the
    /// manifest, or `None` when no type accepts it.
    async fn select(
        &self,
        basepath: &str,
        manifest: &Manifest,
        config: &ViewerConfig,
    ) -> Option<ViewerDescriptor>;
}

/// Arguments handed to each candidate viewer type.
pub struct ViewerBuildArgs<'a> {
    pub basepath: &'a str,
    pub manifest: &'a Manifest,
    /// Descriptor seeded by the selector; a type that accepts fills it in.
    pub viewer: &'a mut ViewerDescriptor,
}

/// One viewer type (image query viewer, sorted composite, geometry, ...).
pub trait ViewerTypeBuilder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Populate `args.viewer` and return true if this type handles the manifest.
    fn build(&self, args: &mut ViewerBuildArgs<'_>) -> bool;
}
