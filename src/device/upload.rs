//! Upload engine: multipart transfer with retry and path reconciliation
//!
//! The device answers a successful upload with a *directory* path
//! (`{"status":100,"path":"/gallerys/default/"}`, mislabeled as
//! `text/javascript`); the final resource path is reconstructed here.
//! Transport failures are retried with exponential backoff; a non-200
//! status is terminal.

use reqwest::multipart;

use super::json::decode_lenient_as;
use super::{gallery_path, ENDPOINT_UPLOAD, TRANSFER_TIMEOUT};
use crate::error::{CanvasError, Result};
use crate::types::UploadResponse;
use crate::DeviceClient;

impl DeviceClient {
    /// Upload image bytes to a gallery, returning the final device path.
    ///
    /// An HTTP 200 is authoritative: if the response body cannot be parsed,
    /// the path is constructed from the gallery/filename convention instead
    /// of failing the upload. Known risk: a device that answers 200 with a
    /// malformed body after a failed store is reported as a success.
    pub async fn upload_image(
        &self,
        image: Vec<u8>,
        filename: &str,
        gallery: &str,
        show_now: bool,
    ) -> Result<String> {
        let url = self.url(ENDPOINT_UPLOAD);
        let show_now_flag = if show_now { "1" } else { "0" };

        self.retry
            .run(|attempt| {
                let image = image.clone();
                let url = url.clone();
                async move {
                    let part = multipart::Part::bytes(image)
                        .file_name(filename.to_string())
                        .mime_str("image/jpeg")?;
                    let form = multipart::Form::new().part("image", part);

                    let response = self
                        .http
                        .post(&url)
                        .query(&[
                            ("filename", filename),
                            ("gallery", gallery),
                            ("show_now", show_now_flag),
                        ])
                        .multipart(form)
                        .timeout(TRANSFER_TIMEOUT)
                        .send()
                        .await
                        .map_err(|err| {
                            tracing::warn!(attempt, filename, error = %err, "upload transport error");
                            CanvasError::Http(err)
                        })?;

                    if !response.status().is_success() {
                        let status = response.status();
                        let body = response.text().await.unwrap_or_default();
                        tracing::error!(%status, body = %body, filename, "upload rejected by device");
                        return Err(CanvasError::Upload(format!(
                            "device returned {status} for {filename}"
                        )));
                    }

                    let body = response.text().await.unwrap_or_default();
                    Ok(reconcile_upload_path(&body, gallery, filename))
                }
            })
            .await
    }
}

/// Turn the device's upload response into the final image path.
fn reconcile_upload_path(body: &str, gallery: &str, filename: &str) -> String {
    match decode_lenient_as::<UploadResponse>(body) {
        Some(response) => {
            let directory = response
                .path
                .unwrap_or_else(|| format!("/gallerys/{gallery}/"));
            let path = join_device_path(&directory, filename);
            tracing::info!(%path, directory, filename, "upload path reconciled");
            path
        }
        None => {
            // 200 is authoritative even when the body is garbage
            let path = gallery_path(gallery, filename);
            tracing::warn!(%path, "unparseable upload response, using conventional path");
            path
        }
    }
}

/// Join a device directory and a filename with exactly one separator.
pub fn join_device_path(directory: &str, filename: &str) -> String {
    format!("{}/{}", directory.trim_end_matches('/'), filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_with_trailing_slash() {
        assert_eq!(
            join_device_path("/gallerys/default/", "a.jpg"),
            "/gallerys/default/a.jpg"
        );
    }

    #[test]
    fn join_without_trailing_slash() {
        assert_eq!(
            join_device_path("/gallerys/default", "a.jpg"),
            "/gallerys/default/a.jpg"
        );
    }

    #[test]
    fn reconcile_uses_device_directory() {
        let path = reconcile_upload_path(r#"{"status":100,"path":"/gallerys/default/"}"#, "other", "a.jpg");
        assert_eq!(path, "/gallerys/default/a.jpg");
    }

    #[test]
    fn reconcile_handles_mislabeled_wrapped_body() {
        let path = reconcile_upload_path("ok{\"status\":100,\"path\":\"/gallerys/art\"}\n", "art", "b.jpg");
        assert_eq!(path, "/gallerys/art/b.jpg");
    }

    #[test]
    fn reconcile_missing_path_uses_gallery_convention() {
        let path = reconcile_upload_path(r#"{"status":100}"#, "default", "a.jpg");
        assert_eq!(path, "/gallerys/default/a.jpg");
    }

    #[test]
    fn reconcile_garbage_body_uses_gallery_convention() {
        let path = reconcile_upload_path("<html>oops</html>", "default", "a.jpg");
        assert_eq!(path, "/gallerys/default/a.jpg");
    }
}
