//! HTTP client for the canvas device

use super::json::{decode_lenient, decode_lenient_as};
use super::{
    COMMAND_TIMEOUT, ENDPOINT_CLEAR_SCREEN, ENDPOINT_DEVICE_INFO, ENDPOINT_GALLERY,
    ENDPOINT_GALLERY_LIST, ENDPOINT_REBOOT, ENDPOINT_SETTINGS, ENDPOINT_SHOW, ENDPOINT_SHOW_NEXT,
    ENDPOINT_SLEEP, ENDPOINT_STATUS, ENDPOINT_WHISTLE,
};
use crate::sync::RetryPolicy;
use crate::types::{DeviceInfo, DeviceSettings, GalleryPage, GalleryRef, PlayType};

/// Client for one canvas device.
///
/// Simple commands return `bool` and never propagate errors; failures are
/// logged and reported as `false`, matching the thin RPC-glue contract.
pub struct DeviceClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) retry: RetryPolicy,
}

impl DeviceClient {
    /// Create a client for a host (`192.168.1.40` or a full `http://` URL).
    pub fn new(host: &str) -> Self {
        Self::with_client(host, reqwest::Client::new())
    }

    /// Create a client with a caller-supplied `reqwest::Client`.
    pub fn with_client(host: &str, http: reqwest::Client) -> Self {
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("http://{host}")
        };
        Self {
            http,
            base_url,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the upload retry policy (tests use a zero-delay policy).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Base URL of the device
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Get raw device status from `GET /status`.
    pub async fn status(&self) -> Option<serde_json::Value> {
        match self
            .http
            .get(self.url(ENDPOINT_STATUS))
            .timeout(COMMAND_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response.json().await.ok(),
            Ok(response) => {
                tracing::debug!(status = %response.status(), "status request rejected");
                None
            }
            Err(err) => {
                tracing::debug!(error = %err, "status request failed");
                None
            }
        }
    }

    /// Get device metadata from `GET /deviceInfo`.
    ///
    /// The firmware labels this body `text/javascript` and may wrap it in
    /// stray output, so it goes through the permissive decoder.
    pub async fn device_info(&self) -> Option<DeviceInfo> {
        let response = match self
            .http
            .get(self.url(ENDPOINT_DEVICE_INFO))
            .timeout(COMMAND_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(status = %response.status(), "device info rejected");
                return None;
            }
            Err(err) => {
                tracing::debug!(error = %err, "device info request failed");
                return None;
            }
        };

        let body = response.text().await.ok()?;
        match decode_lenient_as::<DeviceInfo>(&body) {
            Some(info) => Some(info),
            None => {
                tracing::warn!("invalid JSON in device info response");
                None
            }
        }
    }

    async fn command(&self, name: &str, endpoint: &str, get: bool) -> bool {
        let request = if get {
            self.http.get(self.url(endpoint))
        } else {
            self.http.post(self.url(endpoint))
        };

        match request.timeout(COMMAND_TIMEOUT).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(command = name, "device command sent");
                true
            }
            Ok(response) => {
                tracing::error!(command = name, status = %response.status(), "device command rejected");
                false
            }
            Err(err) => {
                tracing::error!(command = name, error = %err, "device command failed");
                false
            }
        }
    }

    /// Advance to the next image.
    pub async fn show_next(&self) -> bool {
        self.command("showNext", ENDPOINT_SHOW_NEXT, false).await
    }

    /// Put the device to sleep.
    pub async fn sleep(&self) -> bool {
        self.command("sleep", ENDPOINT_SLEEP, false).await
    }

    /// Reboot the device.
    pub async fn reboot(&self) -> bool {
        self.command("reboot", ENDPOINT_REBOOT, false).await
    }

    /// Clear the screen.
    pub async fn clear_screen(&self) -> bool {
        self.command("clearScreen", ENDPOINT_CLEAR_SCREEN, false)
            .await
    }

    /// Send the keep-alive signal. This one is a GET, unlike every other
    /// command; the firmware does not answer a POST here.
    pub async fn whistle(&self) -> bool {
        self.command("whistle", ENDPOINT_WHISTLE, true).await
    }

    /// Push recognized settings keys to `POST /settings`.
    pub async fn update_settings(&self, settings: &DeviceSettings) -> bool {
        if settings.is_empty() {
            tracing::warn!("no settings parameters provided");
            return false;
        }

        match self
            .http
            .post(self.url(ENDPOINT_SETTINGS))
            .timeout(COMMAND_TIMEOUT)
            .json(settings)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::info!(?settings, "settings updated");
                true
            }
            Ok(response) => {
                tracing::error!(status = %response.status(), "settings update rejected");
                false
            }
            Err(err) => {
                tracing::error!(error = %err, "settings update failed");
                false
            }
        }
    }

    /// Show an image given its full device path (`/gallerys/{g}/{f}`).
    ///
    /// Paths that don't follow the convention fall back to the `default`
    /// gallery with the last path segment as the filename.
    pub async fn show_image(
        &self,
        image_path: &str,
        play_type: PlayType,
        dither: Option<u8>,
        duration: u32,
    ) -> bool {
        let (gallery, filename) = split_gallery_path(image_path);
        self.show_image_by_name(&filename, &gallery, play_type, dither, duration)
            .await
    }

    /// Show an image by filename and gallery via `POST /show`.
    pub async fn show_image_by_name(
        &self,
        filename: &str,
        gallery: &str,
        play_type: PlayType,
        dither: Option<u8>,
        duration: u32,
    ) -> bool {
        let mut payload = serde_json::json!({ "play_type": play_type.code() });
        match play_type {
            // Single image and playlist modes take the full path
            PlayType::Single | PlayType::Playlist => {
                payload["image"] = serde_json::json!(super::gallery_path(gallery, filename));
            }
            // Slideshow mode takes the bare filename plus gallery and duration
            PlayType::Slideshow => {
                payload["image"] = serde_json::json!(filename);
                payload["gallery"] = serde_json::json!(gallery);
                payload["duration"] = serde_json::json!(duration);
            }
        }
        if let Some(dither) = dither {
            payload["dither"] = serde_json::json!(dither);
        }

        tracing::info!(gallery, filename, ?payload, "showing image");

        match self
            .http
            .post(self.url(ENDPOINT_SHOW))
            .timeout(COMMAND_TIMEOUT)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                tracing::info!(gallery, filename, "image displayed");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, body = %body, "failed to show image");
                false
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to show image");
                false
            }
        }
    }

    /// List galleries via `GET /gallery/list`. Empty on any failure.
    pub async fn galleries(&self) -> Vec<GalleryRef> {
        match self
            .http
            .get(self.url(ENDPOINT_GALLERY_LIST))
            .timeout(COMMAND_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                let body = response.text().await.unwrap_or_default();
                match decode_lenient(&body).and_then(|v| serde_json::from_value(v).ok()) {
                    Some(galleries) => galleries,
                    None => {
                        tracing::error!("failed to parse galleries response");
                        Vec::new()
                    }
                }
            }
            Ok(response) => {
                tracing::error!(status = %response.status(), "gallery list rejected");
                Vec::new()
            }
            Err(err) => {
                tracing::error!(error = %err, "gallery list failed");
                Vec::new()
            }
        }
    }

    /// Get one page of a gallery via `GET /gallery`. Empty page on failure.
    pub async fn gallery_images(&self, gallery: &str, offset: u64, limit: u64) -> GalleryPage {
        let result = self
            .http
            .get(self.url(ENDPOINT_GALLERY))
            .query(&[
                ("gallery_name", gallery),
                ("offset", &offset.to_string()),
                ("limit", &limit.to_string()),
            ])
            .timeout(COMMAND_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                let body = response.text().await.unwrap_or_default();
                decode_lenient_as::<GalleryPage>(&body).unwrap_or_else(|| {
                    tracing::error!("failed to parse gallery images response");
                    GalleryPage::default()
                })
            }
            Ok(response) => {
                tracing::error!(status = %response.status(), "gallery images rejected");
                GalleryPage::default()
            }
            Err(err) => {
                tracing::error!(error = %err, "gallery images failed");
                GalleryPage::default()
            }
        }
    }
}

/// Split `/gallerys/{gallery}/{filename}` into its parts, falling back to
/// the `default` gallery and the last path segment.
fn split_gallery_path(image_path: &str) -> (String, String) {
    let parts: Vec<&str> = image_path.trim_matches('/').split('/').collect();
    if parts.len() >= 3 && parts[0] == "gallerys" {
        (parts[1].to_string(), parts[2].to_string())
    } else {
        let filename = image_path.rsplit('/').next().unwrap_or(image_path);
        ("default".to_string(), filename.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_path_splits() {
        assert_eq!(
            split_gallery_path("/gallerys/travel/beach.jpg"),
            ("travel".to_string(), "beach.jpg".to_string())
        );
    }

    #[test]
    fn unconventional_path_falls_back_to_default() {
        assert_eq!(
            split_gallery_path("/somewhere/else/pic.jpg"),
            ("default".to_string(), "pic.jpg".to_string())
        );
        assert_eq!(
            split_gallery_path("pic.jpg"),
            ("default".to_string(), "pic.jpg".to_string())
        );
    }

    #[test]
    fn base_url_normalization() {
        assert_eq!(DeviceClient::new("192.168.1.40").base_url(), "http://192.168.1.40");
        assert_eq!(
            DeviceClient::new("http://192.168.1.40/").base_url(),
            "http://192.168.1.40"
        );
    }
}
