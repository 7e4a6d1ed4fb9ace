//! Device registry and alias editor
//!
//! Polls `GET /api/devices/` and keeps per-device alias edit buffers. Server
//! data only seeds a buffer for addresses that have none, so a poll never
//! overwrites an edit in progress.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::api::{AliasRequest, Device, SharedApi};
use crate::notify::Notifier;
use crate::poll::{Generation, GenerationGuard, PollHandle, Poller};

/// Error flag shown when the devices endpoint fails
pub const DEVICES_UNREACHABLE: &str = "devices-unreachable";

pub const ALIAS_SAVED: &str = "Alias saved";
pub const ALIAS_SAVE_FAILED: &str = "Alias save failed";

/// Per-device alias save progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saving,
    Saved,
    Error,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Saving => write!(f, "saving..."),
            SaveStatus::Saved => write!(f, "saved"),
            SaveStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DevicesState {
    pub loading: bool,
    pub error: Option<String>,
    pub devices: Vec<Device>,
    /// Alias edit buffers keyed by address
    pub alias_inputs: BTreeMap<String, String>,
    pub save_status: BTreeMap<String, SaveStatus>,
}

impl Default for DevicesState {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            devices: Vec::new(),
            alias_inputs: BTreeMap::new(),
            save_status: BTreeMap::new(),
        }
    }
}

impl DevicesState {
    pub fn alias_input(&self, address: &str) -> &str {
        self.alias_inputs.get(address).map(String::as_str).unwrap_or("")
    }

    /// Listed device for `address`, ignoring case
    pub fn device(&self, address: &str) -> Option<&Device> {
        let address = address.trim();
        self.devices
            .iter()
            .find(|d| d.address.eq_ignore_ascii_case(address))
    }

    /// The listed spelling of `address`, or the trimmed input when no
    /// device matches
    pub fn canonical_address(&self, address: &str) -> String {
        match self.device(address) {
            Some(device) => device.address.clone(),
            None => address.trim().to_string(),
        }
    }
}

#[derive(Clone)]
pub struct DeviceRegistry {
    api: SharedApi,
    notifier: Notifier,
    state: Arc<RwLock<DevicesState>>,
    generation: Generation,
}

impl DeviceRegistry {
    pub fn new(api: SharedApi, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            state: Arc::new(RwLock::new(DevicesState::default())),
            generation: Generation::new(),
        }
    }

    pub async fn state(&self) -> DevicesState {
        self.state.read().await.clone()
    }

    pub async fn refresh(&self) {
        self.refresh_guarded(self.generation.guard()).await;
    }

    async fn refresh_guarded(&self, guard: GenerationGuard) {
        let result = self.api.devices().await;

        let mut state = self.state.write().await;
        if !guard.is_current() {
            tracing::debug!("Discarding superseded devices response");
            return;
        }
        state.loading = false;

        match result {
            Ok(devices) => {
                tracing::debug!(count = devices.len(), "Devices loaded");
                for device in &devices {
                    state
                        .alias_inputs
                        .entry(device.address.clone())
                        .or_insert_with(|| device.alias.clone());
                }
                state.error = None;
                state.devices = devices;
            }
            Err(e) => {
                tracing::warn!("Devices request failed: {}", e);
                state.error = Some(DEVICES_UNREACHABLE.to_string());
                state.devices.clear();
            }
        }
    }

    /// Replace the edit buffer for `address`
    pub async fn set_alias_input(&self, address: &str, alias: impl Into<String>) {
        let mut state = self.state.write().await;
        let address = state.canonical_address(address);
        state.alias_inputs.insert(address, alias.into());
    }

    /// Submit the buffered alias for `address`.
    ///
    /// The outcome is reported through the per-device status and a
    /// notification; failures are not retried.
    pub async fn save_alias(&self, address: &str) -> SaveStatus {
        let (address, alias) = {
            let mut state = self.state.write().await;
            let address = state.canonical_address(address);
            state.save_status.insert(address.clone(), SaveStatus::Saving);
            let alias = state.alias_input(&address).trim().to_string();
            (address, alias)
        };

        let request = AliasRequest {
            address: address.clone(),
            alias,
        };

        let status = match self.api.save_alias(&request).await {
            Ok(updated) => {
                let mut state = self.state.write().await;
                // The backend answers with its own spelling of the address
                let key = state
                    .device(&updated.address)
                    .map(|d| d.address.clone())
                    .unwrap_or_else(|| address.clone());
                if key != address {
                    state.save_status.remove(&address);
                }
                if let Some(device) = state.devices.iter_mut().find(|d| d.address == key) {
                    device.alias = updated.alias;
                    device.detected_name = updated.detected_name;
                    device.display_name = updated.display_name;
                    device.updated_at = updated.updated_at;
                }
                state.save_status.insert(key, SaveStatus::Saved);
                SaveStatus::Saved
            }
            Err(e) => {
                tracing::warn!(address = %address, "Alias save failed: {}", e);
                self.state
                    .write()
                    .await
                    .save_status
                    .insert(address, SaveStatus::Error);
                SaveStatus::Error
            }
        };

        let message = match status {
            SaveStatus::Saved => ALIAS_SAVED,
            _ => ALIAS_SAVE_FAILED,
        };
        self.notifier.show(message).await;

        status
    }

    pub fn start(&self, period: Duration) -> PollHandle {
        let registry = self.clone();
        let generation = self.generation.clone();

        Poller::spawn("devices", period, self.generation.clone(), move || {
            let guard = generation.guard();
            let registry = registry.clone();
            async move { registry.refresh_guarded(guard).await }
        })
    }
}
