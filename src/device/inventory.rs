//! Gallery inventory snapshot for dedup

use std::collections::HashSet;

use crate::DeviceClient;

/// Page size for the inventory request.
///
/// The inventory is a single large-page request with no follow-up
/// pagination. Galleries holding more than this many images under-report
/// existing names, so dedup produces false negatives and re-uploads
/// duplicates. Accepted scale limit.
pub const INVENTORY_PAGE_SIZE: u64 = 1000;

impl DeviceClient {
    /// Snapshot the names already present in a gallery.
    ///
    /// Returns an empty set when the device cannot be queried; the sync
    /// engine then treats every candidate as new rather than aborting.
    pub async fn existing_photos(&self, gallery: &str) -> HashSet<String> {
        let page = self.gallery_images(gallery, 0, INVENTORY_PAGE_SIZE).await;
        let names: HashSet<String> = page.data.into_iter().map(|image| image.name).collect();
        tracing::info!(count = names.len(), gallery, "existing photos in gallery");
        names
    }
}
