//! Device HTTP transport and gallery operations
//!
//! The canvas exposes a plain-text HTTP API. Simple commands map one request
//! to a boolean outcome; uploads carry retry and path-reconciliation logic
//! (see `upload`). All bodies go through the permissive decoder in `json`
//! because the firmware mislabels content-types.

pub mod client;
pub mod inventory;
pub mod json;
pub mod upload;

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::PlayType;

pub use client::DeviceClient;
pub use inventory::INVENTORY_PAGE_SIZE;
pub use upload::join_device_path;

/// Timeout for simple command and status calls
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for uploads and photo downloads
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);

/// Display duration the firmware treats as "until replaced"
pub const DEFAULT_DURATION: u32 = 99_999;

pub(crate) const ENDPOINT_STATUS: &str = "/status";
pub(crate) const ENDPOINT_DEVICE_INFO: &str = "/deviceInfo";
pub(crate) const ENDPOINT_SHOW: &str = "/show";
pub(crate) const ENDPOINT_SHOW_NEXT: &str = "/showNext";
pub(crate) const ENDPOINT_SLEEP: &str = "/sleep";
pub(crate) const ENDPOINT_REBOOT: &str = "/reboot";
pub(crate) const ENDPOINT_CLEAR_SCREEN: &str = "/clearScreen";
pub(crate) const ENDPOINT_SETTINGS: &str = "/settings";
pub(crate) const ENDPOINT_WHISTLE: &str = "/whistle";
pub(crate) const ENDPOINT_UPLOAD: &str = "/upload";
pub(crate) const ENDPOINT_GALLERY_LIST: &str = "/gallery/list";
pub(crate) const ENDPOINT_GALLERY: &str = "/gallery";

/// Conventional path of an image inside a device gallery
pub fn gallery_path(gallery: &str, filename: &str) -> String {
    format!("/gallerys/{gallery}/{filename}")
}

/// The device-side seam the sync engine writes through.
///
/// `DeviceClient` is the production implementation; tests substitute an
/// in-memory store.
#[async_trait]
pub trait GalleryStore: Send + Sync {
    /// Names already present in a gallery. Empty when the device cannot be
    /// queried; dedup then degrades to treating everything as new.
    async fn existing_photos(&self, gallery: &str) -> HashSet<String>;

    /// Store image bytes in a gallery, returning the final device path.
    async fn store_photo(
        &self,
        image: Vec<u8>,
        filename: &str,
        gallery: &str,
        show_now: bool,
    ) -> Result<String>;

    /// Bring an already-stored image to the screen.
    async fn display(&self, path: &str) -> bool;
}

#[async_trait]
impl GalleryStore for DeviceClient {
    async fn existing_photos(&self, gallery: &str) -> HashSet<String> {
        DeviceClient::existing_photos(self, gallery).await
    }

    async fn store_photo(
        &self,
        image: Vec<u8>,
        filename: &str,
        gallery: &str,
        show_now: bool,
    ) -> Result<String> {
        self.upload_image(image, filename, gallery, show_now).await
    }

    async fn display(&self, path: &str) -> bool {
        self.show_image(path, PlayType::Single, None, DEFAULT_DURATION)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_path_convention() {
        assert_eq!(
            gallery_path("default", "sunset.jpg"),
            "/gallerys/default/sunset.jpg"
        );
    }
}
