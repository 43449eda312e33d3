//! Photo synchronization pipeline
//!
//! The orchestrator walks a host media tree into candidates, dedups against
//! the device gallery, then fetches and uploads each candidate in traversal
//! order. Strictly sequential within a run: errors map unambiguously to one
//! candidate, and no failure crosses the `sync_photos` boundary — every
//! outcome lands in the [`SyncReport`].
//!
//! Runs against the same device are not mutually excluded; a sibling run's
//! uploads can race another run's inventory snapshot. Accepted limitation.

mod report;
mod retry;

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;

use crate::device::GalleryStore;
use crate::error::{CanvasError, Result};
use crate::media::{collect_photos, MediaLibrary, PhotoFetcher};
use crate::DeviceClient;

pub use report::{SyncReport, ERROR_SUMMARY_LIMIT};
pub use retry::RetryPolicy;

/// Gallery used when the caller does not name one
pub const DEFAULT_GALLERY: &str = "default";
/// Default cap on candidates per sync run
pub const DEFAULT_MAX_PHOTOS: usize = 50;
/// Discovery cap for the random-pick operation
pub const RANDOM_PICK_POOL: usize = 100;

/// Options for one sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Target gallery on the device
    pub gallery: String,
    /// Candidates beyond this are never considered and appear in no counter
    pub max_photos: usize,
    /// When set, skip the inventory snapshot and upload everything
    pub overwrite: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            gallery: DEFAULT_GALLERY.to_string(),
            max_photos: DEFAULT_MAX_PHOTOS,
            overwrite: false,
        }
    }
}

/// Coordinates walker, inventory, fetcher and upload engine for sync runs.
pub struct SyncEngine {
    store: Arc<dyn GalleryStore>,
    library: Arc<dyn MediaLibrary>,
    fetcher: Arc<dyn PhotoFetcher>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn GalleryStore>,
        library: Arc<dyn MediaLibrary>,
        fetcher: Arc<dyn PhotoFetcher>,
    ) -> Self {
        Self {
            store,
            library,
            fetcher,
        }
    }

    /// Engine wired to a real device, fetching over HTTP.
    pub fn for_device(device: Arc<DeviceClient>, library: Arc<dyn MediaLibrary>) -> Self {
        let fetcher = Arc::new(crate::media::HttpPhotoFetcher::new(library.clone()));
        Self::new(device, library, fetcher)
    }

    /// Sync photos from a media source into a device gallery.
    ///
    /// Never returns an error: every failure, including a malformed source
    /// id, is captured in the returned report. An empty media source is a
    /// success with all counters at zero.
    pub async fn sync_photos(&self, source_id: &str, options: &SyncOptions) -> SyncReport {
        let mut report = SyncReport::default();

        if !self.library.is_source_id(source_id) {
            tracing::error!(source = source_id, "photo sync aborted: invalid media source id");
            report.record_aborted(format!("invalid media source id: {source_id}"));
            return report;
        }

        tracing::info!(
            source = source_id,
            gallery = %options.gallery,
            max_photos = options.max_photos,
            overwrite = options.overwrite,
            "starting photo sync"
        );

        let root = match self.library.browse(source_id).await {
            Ok(root) => root,
            Err(err) => {
                report.record_aborted(format!("failed to browse media source {source_id}: {err}"));
                return report;
            }
        };

        let candidates = collect_photos(root.as_ref(), options.max_photos);
        if candidates.is_empty() {
            tracing::warn!(source = source_id, "no photos found in media source");
            // Empty input is success, not failure
            report.success = true;
            return report;
        }
        tracing::info!(count = candidates.len(), "found photos to sync");

        // One inventory snapshot per run; photos uploaded during the run are
        // not re-checked against it
        let existing = if options.overwrite {
            HashSet::new()
        } else {
            self.store.existing_photos(&options.gallery).await
        };

        for candidate in &candidates {
            if !options.overwrite && existing.contains(&candidate.name) {
                tracing::debug!(name = %candidate.name, "skipping existing photo");
                report.record_skip();
                continue;
            }

            let image = match self.fetcher.fetch(&candidate.content_id).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    report.record_failure(format!(
                        "failed to download photo {}: {err}",
                        candidate.name
                    ));
                    continue;
                }
            };

            match self
                .store
                .store_photo(image, &candidate.name, &options.gallery, false)
                .await
            {
                Ok(path) => {
                    tracing::info!(name = %candidate.name, path = %path, "photo synced");
                    report.record_upload(path);
                }
                Err(err) => {
                    report.record_failure(format!(
                        "failed to upload photo {}: {err}",
                        candidate.name
                    ));
                }
            }
        }

        report.finish();
        tracing::info!(
            success = report.success,
            succeeded = report.succeeded,
            skipped = report.skipped,
            failed = report.failed,
            "photo sync completed"
        );
        report
    }

    /// Pick one photo uniformly at random from up to [`RANDOM_PICK_POOL`]
    /// discovered candidates, store it, and bring it to the screen.
    /// Returns the device path of the shown image.
    pub async fn push_random_item(&self, source_id: &str) -> Result<String> {
        if !self.library.is_source_id(source_id) {
            return Err(CanvasError::InvalidInput(format!(
                "invalid media source id: {source_id}"
            )));
        }

        let root = self.library.browse(source_id).await?;
        let candidates = collect_photos(root.as_ref(), RANDOM_PICK_POOL);
        if candidates.is_empty() {
            return Err(CanvasError::Media(format!(
                "no photos found in media source {source_id}"
            )));
        }

        let index = rand::thread_rng().gen_range(0..candidates.len());
        let candidate = &candidates[index];
        tracing::info!(name = %candidate.name, pool = candidates.len(), "pushing random photo");

        let image = self.fetcher.fetch(&candidate.content_id).await?;
        let path = self
            .store
            .store_photo(image, &candidate.name, DEFAULT_GALLERY, false)
            .await?;

        if !self.store.display(&path).await {
            return Err(CanvasError::Protocol(format!(
                "device refused to display {path}"
            )));
        }
        Ok(path)
    }
}
