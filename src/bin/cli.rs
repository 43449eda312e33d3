//! Operator CLI for the e-ink canvas
//!
//! Media sources are JSON manifest files describing a tree of image URLs,
//! standing in for a host media library:
//!
//! ```json
//! {
//!   "title": "vacation",
//!   "media_class": "directory",
//!   "children": [
//!     { "title": "beach.jpg", "media_class": "image", "can_play": true,
//!       "content_type": "image/jpeg", "content_id": "http://nas/beach.jpg" }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use eink_canvas::error::CanvasError;
use eink_canvas::media::{MediaClass, MediaLibrary, MediaNode};
use eink_canvas::sync::SyncOptions;
use eink_canvas::{Controller, DeviceClient, DeviceSettings};

#[derive(Parser)]
#[command(name = "eink-canvas")]
#[command(about = "Control and sync an e-ink canvas display")]
#[command(version)]
struct Cli {
    /// Device host (IP or hostname)
    #[arg(long, env = "CANVAS_HOST")]
    host: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show raw device status
    Status,
    /// Fetch and show device metadata
    DeviceInfo,
    /// Advance to the next image
    ShowNext,
    /// Put the device to sleep
    Sleep,
    /// Reboot the device
    Reboot,
    /// Clear the screen
    ClearScreen,
    /// Send the keep-alive signal
    Whistle,
    /// List galleries on the device
    Galleries,
    /// Update device settings
    UpdateSettings {
        /// Device name
        #[arg(long)]
        name: Option<String>,
        /// Sleep duration in seconds
        #[arg(long)]
        sleep_duration: Option<u32>,
        /// Max idle time in seconds
        #[arg(long)]
        max_idle: Option<u32>,
        /// Wake sensitivity index
        #[arg(long)]
        idx_wake_sens: Option<u32>,
    },
    /// Sync photos from a media manifest into a gallery
    SyncPhotos {
        /// Path to a JSON media manifest
        media_source: String,
        /// Target gallery on the device
        #[arg(long, default_value = "default")]
        gallery: String,
        /// Maximum number of photos to sync
        #[arg(long, default_value = "50")]
        max_photos: usize,
        /// Overwrite photos that already exist on the device
        #[arg(long)]
        overwrite: bool,
    },
    /// Show one random photo from a media manifest
    PushRandom {
        /// Path to a JSON media manifest
        media_source: String,
    },
}

/// A media tree loaded from a JSON manifest file
#[derive(Debug, Clone, Deserialize)]
struct ManifestNode {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content_id: String,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default = "directory_class")]
    media_class: MediaClass,
    #[serde(default)]
    can_play: bool,
    #[serde(default)]
    children: Vec<ManifestNode>,
}

fn directory_class() -> MediaClass {
    MediaClass::Directory
}

impl MediaNode for ManifestNode {
    fn media_class(&self) -> MediaClass {
        self.media_class
    }
    fn can_play(&self) -> bool {
        self.can_play
    }
    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn content_id(&self) -> &str {
        &self.content_id
    }
    fn children(&self) -> Vec<&dyn MediaNode> {
        self.children.iter().map(|c| c as &dyn MediaNode).collect()
    }
}

/// Library backed by manifest files on disk; content ids are already URLs.
struct ManifestLibrary;

#[async_trait]
impl MediaLibrary for ManifestLibrary {
    fn is_source_id(&self, reference: &str) -> bool {
        Path::new(reference).is_file()
    }

    async fn browse(
        &self,
        source_id: &str,
    ) -> eink_canvas::Result<Box<dyn MediaNode + Send + Sync>> {
        let text = tokio::fs::read_to_string(source_id).await?;
        let root: ManifestNode = serde_json::from_str(&text)
            .map_err(|err| CanvasError::Media(format!("invalid manifest {source_id}: {err}")))?;
        Ok(Box::new(root))
    }

    async fn resolve_url(&self, content_id: &str) -> eink_canvas::Result<String> {
        Ok(content_id.to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let device = Arc::new(DeviceClient::new(&cli.host));
    let controller = Controller::new(device.clone(), Arc::new(ManifestLibrary));

    match cli.command {
        Commands::Status => {
            let status = device.status().await.context("device did not answer")?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::DeviceInfo => {
            let info = controller
                .refresh_device_info()
                .await
                .context("failed to fetch device info")?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::ShowNext => run_command(controller.show_next().await, "show next")?,
        Commands::Sleep => run_command(controller.sleep().await, "sleep")?,
        Commands::Reboot => run_command(controller.reboot().await, "reboot")?,
        Commands::ClearScreen => run_command(controller.clear_screen().await, "clear screen")?,
        Commands::Whistle => run_command(controller.whistle().await, "whistle")?,
        Commands::Galleries => {
            for gallery in device.galleries().await {
                println!("{}", gallery.name);
            }
        }
        Commands::UpdateSettings {
            name,
            sleep_duration,
            max_idle,
            idx_wake_sens,
        } => {
            let settings = DeviceSettings {
                name,
                sleep_duration,
                max_idle,
                idx_wake_sens,
            };
            run_command(controller.update_settings(settings).await, "update settings")?;
        }
        Commands::SyncPhotos {
            media_source,
            gallery,
            max_photos,
            overwrite,
        } => {
            let options = SyncOptions {
                gallery,
                max_photos,
                overwrite,
            };
            let report = controller.sync_photos(&media_source, &options).await;
            println!(
                "Synced: {}, Skipped: {}, Failed: {}",
                report.succeeded, report.skipped, report.failed
            );
            for path in &report.uploaded_paths {
                println!("  {path}");
            }
            for error in report.error_summary() {
                eprintln!("error: {error}");
            }
            if !report.success {
                bail!("photo sync failed");
            }
        }
        Commands::PushRandom { media_source } => {
            let path = controller.push_random_item(&media_source).await?;
            println!("Now showing {path}");
        }
    }

    Ok(())
}

fn run_command(ok: bool, name: &str) -> anyhow::Result<()> {
    if ok {
        println!("{name}: ok");
        Ok(())
    } else {
        bail!("{name} failed")
    }
}
