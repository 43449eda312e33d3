//! Wire types for the canvas device API
//!
//! The device speaks plain-text HTTP with JSON bodies. Fields here are kept
//! loose (`Option` + `#[serde(default)]`) because firmware revisions add and
//! drop fields freely; unknown fields are collected rather than rejected.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Device metadata from `GET /deviceInfo`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub battery: Option<i64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub current_image: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    /// Anything else the firmware reports
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A gallery reference from `GET /gallery/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryRef {
    pub name: String,
}

/// One image entry from `GET /gallery`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub time: Option<serde_json::Value>,
}

/// A page of gallery contents from `GET /gallery`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GalleryPage {
    #[serde(default)]
    pub data: Vec<GalleryImage>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
}

/// Body of a successful `POST /upload` response.
///
/// `path` is the gallery *directory* (e.g. `/gallerys/default/`), not the
/// final resource path; the upload engine joins the filename onto it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Recognized keys for `POST /settings`. Unset fields are omitted from the
/// request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_idle: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idx_wake_sens: Option<u32>,
}

impl DeviceSettings {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.sleep_duration.is_none()
            && self.max_idle.is_none()
            && self.idx_wake_sens.is_none()
    }
}

/// Playback mode for `POST /show`.
///
/// The `image` field format depends on this: `Single` and `Playlist` take a
/// full device path, `Slideshow` takes a bare filename plus separate
/// `gallery` and `duration` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayType {
    #[default]
    Single,
    Slideshow,
    Playlist,
}

impl PlayType {
    /// Wire value for the `play_type` field
    pub fn code(self) -> u8 {
        match self {
            PlayType::Single => 0,
            PlayType::Slideshow => 1,
            PlayType::Playlist => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_serialize_to_empty_object() {
        let settings = DeviceSettings::default();
        assert!(settings.is_empty());
        assert_eq!(serde_json::to_string(&settings).unwrap(), "{}");
    }

    #[test]
    fn partial_settings_omit_unset_keys() {
        let settings = DeviceSettings {
            sleep_duration: Some(600),
            ..Default::default()
        };
        assert!(!settings.is_empty());
        assert_eq!(
            serde_json::to_string(&settings).unwrap(),
            r#"{"sleep_duration":600}"#
        );
    }

    #[test]
    fn gallery_page_tolerates_missing_fields() {
        let page: GalleryPage = serde_json::from_str(r#"{"data":[{"name":"a.jpg"}]}"#).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn device_info_keeps_unknown_fields() {
        let info: DeviceInfo =
            serde_json::from_str(r#"{"name":"canvas","fw_build":"20240110"}"#).unwrap();
        assert_eq!(info.name.as_deref(), Some("canvas"));
        assert!(info.extra.contains_key("fw_build"));
    }

    #[test]
    fn play_type_codes() {
        assert_eq!(PlayType::Single.code(), 0);
        assert_eq!(PlayType::Slideshow.code(), 1);
        assert_eq!(PlayType::Playlist.code(), 2);
    }
}
