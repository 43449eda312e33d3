//! Operator command surface
//!
//! One method per named operation, each recording its outcome in the
//! [`LogBook`] and, for device metadata, refreshing the cached snapshot.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::device::DeviceClient;
use crate::error::Result;
use crate::logbook::{LogBook, LogEntry};
use crate::media::MediaLibrary;
use crate::sync::{SyncEngine, SyncOptions, SyncReport};
use crate::types::{DeviceInfo, DeviceSettings};

pub struct Controller {
    device: Arc<DeviceClient>,
    engine: SyncEngine,
    logs: Mutex<LogBook>,
    device_info: Mutex<Option<DeviceInfo>>,
}

impl Controller {
    pub fn new(device: Arc<DeviceClient>, library: Arc<dyn MediaLibrary>) -> Self {
        let engine = SyncEngine::for_device(device.clone(), library);
        Self {
            device,
            engine,
            logs: Mutex::new(LogBook::new()),
            device_info: Mutex::new(None),
        }
    }

    /// Snapshot of the operator log, oldest first
    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.lock().entries().cloned().collect()
    }

    /// Last fetched device metadata, if any
    pub fn cached_device_info(&self) -> Option<DeviceInfo> {
        self.device_info.lock().clone()
    }

    pub async fn show_next(&self) -> bool {
        let ok = self.device.show_next().await;
        let mut logs = self.logs.lock();
        if ok {
            logs.info("Switched to next image");
        } else {
            logs.error("Failed to switch to next image");
        }
        ok
    }

    pub async fn sleep(&self) -> bool {
        let ok = self.device.sleep().await;
        let mut logs = self.logs.lock();
        if ok {
            logs.info("Device entered sleep mode");
        } else {
            logs.error("Device sleep failed");
        }
        ok
    }

    pub async fn reboot(&self) -> bool {
        let ok = self.device.reboot().await;
        let mut logs = self.logs.lock();
        if ok {
            logs.info("Device reboot command sent");
        } else {
            logs.error("Device reboot failed");
        }
        ok
    }

    pub async fn clear_screen(&self) -> bool {
        let ok = self.device.clear_screen().await;
        let mut logs = self.logs.lock();
        if ok {
            logs.info("Screen cleared");
        } else {
            logs.error("Clear screen failed");
        }
        ok
    }

    pub async fn whistle(&self) -> bool {
        let ok = self.device.whistle().await;
        let mut logs = self.logs.lock();
        if ok {
            logs.info("Keep alive signal sent");
        } else {
            logs.error("Keep alive failed");
        }
        ok
    }

    pub async fn refresh_device_info(&self) -> Option<DeviceInfo> {
        match self.device.device_info().await {
            Some(info) => {
                *self.device_info.lock() = Some(info.clone());
                self.logs.lock().info("Device info refreshed");
                Some(info)
            }
            None => {
                self.logs.lock().error("Failed to refresh device info");
                None
            }
        }
    }

    pub async fn update_settings(&self, settings: DeviceSettings) -> bool {
        if settings.is_empty() {
            self.logs.lock().warning("No settings parameters provided");
            return false;
        }
        let ok = self.device.update_settings(&settings).await;
        let mut logs = self.logs.lock();
        if ok {
            logs.info("Device settings updated");
        } else {
            logs.error("Settings update failed");
        }
        ok
    }

    pub async fn sync_photos(&self, source_id: &str, options: &SyncOptions) -> SyncReport {
        self.logs.lock().info(format!(
            "Starting photo sync from {source_id} to gallery {}",
            options.gallery
        ));

        let report = self.engine.sync_photos(source_id, options).await;

        let mut logs = self.logs.lock();
        if report.success {
            logs.info(format!(
                "Photo sync completed - Synced: {}, Skipped: {}, Failed: {}",
                report.succeeded, report.skipped, report.failed
            ));
        } else {
            logs.error(format!(
                "Photo sync failed - Errors: {}, Synced: {}, Failed: {}",
                report.errors.len(),
                report.succeeded,
                report.failed
            ));
            // Suppressed errors remain counted but are not surfaced
            for error in report.error_summary() {
                logs.error(format!("Sync error: {error}"));
            }
        }
        report
    }

    pub async fn push_random_item(&self, source_id: &str) -> Result<String> {
        match self.engine.push_random_item(source_id).await {
            Ok(path) => {
                self.logs.lock().info(format!("Now showing {path}"));
                Ok(path)
            }
            Err(err) => {
                self.logs
                    .lock()
                    .error(format!("Failed to push random item: {err}"));
                Err(err)
            }
        }
    }
}
