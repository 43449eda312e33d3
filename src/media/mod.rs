//! Media source abstraction and photo discovery
//!
//! The host platform owns the media hierarchy; this crate only reads it
//! through the capability traits below. `MediaNode` is the read-only tree
//! seam, `MediaLibrary` the resolution/browsing collaborator, and the
//! walker in `walker` turns a tree into a flat candidate list.

pub mod fetch;
pub mod walker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use fetch::{HttpPhotoFetcher, PhotoFetcher};
pub use walker::collect_photos;

/// Media class tag on a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaClass {
    Image,
    Photo,
    Directory,
    #[serde(other)]
    Other,
}

/// A read-only node in a host-provided media tree.
///
/// Deliberately a capability trait rather than a concrete host type so the
/// walker stays host-agnostic.
pub trait MediaNode {
    fn media_class(&self) -> MediaClass;
    fn can_play(&self) -> bool;
    fn content_type(&self) -> Option<&str>;
    fn title(&self) -> &str;
    fn content_id(&self) -> &str;
    fn children(&self) -> Vec<&dyn MediaNode>;

    /// A node is a photo leaf iff it is an image/photo, playable, and
    /// carries an `image/*` content type.
    fn is_photo_leaf(&self) -> bool {
        matches!(self.media_class(), MediaClass::Image | MediaClass::Photo)
            && self.can_play()
            && self
                .content_type()
                .is_some_and(|content_type| content_type.starts_with("image/"))
    }
}

/// A discovered photo leaf awaiting a sync decision.
///
/// `content_id` is an opaque reference resolved later by the fetcher; the
/// walker never inspects it. Lives only within one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoCandidate {
    pub name: String,
    pub content_id: String,
}

/// Host collaborator that resolves and browses media references.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Whether a reference is a well-formed media source id for this host.
    fn is_source_id(&self, reference: &str) -> bool;

    /// Browse a media source into its tree of nodes.
    async fn browse(&self, source_id: &str) -> Result<Box<dyn MediaNode + Send + Sync>>;

    /// Resolve an opaque content reference into a transport URL.
    async fn resolve_url(&self, content_id: &str) -> Result<String>;
}
