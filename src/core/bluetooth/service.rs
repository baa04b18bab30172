//! Bluetooth service
//! Scans through a [`BluetoothDriver`], records devices into storage and
//! replays recorded devices.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use serde_json::json;

use crate::core::bluetooth::constants::{BLUETOOTH_PROTOCOL, UNKNOWN_DEVICE_CLASS};
use crate::core::bluetooth::driver::BluetoothDriver;
use crate::core::bluetooth::types::BluetoothDevice;
use crate::events::{AppEvent, EventSink};
use crate::model::{SignalProperties, SignalRecord};
use crate::storage::StorageService;
use crate::utils::now_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdapterState {
    Uninitialized,
    Unavailable,
    Available,
}

pub struct BluetoothService {
    driver: Arc<dyn BluetoothDriver>,
    storage: StorageService,
    events: EventSink,
    state: AdapterState,
}

impl BluetoothService {
    pub fn new(driver: Arc<dyn BluetoothDriver>, storage: StorageService, events: EventSink) -> Self {
        Self {
            driver,
            storage,
            events,
            state: AdapterState::Uninitialized,
        }
    }

    /// Probes the adapter and returns true once the service is initialized.
    /// A failed probe leaves the service uninitialized so it can be retried.
    pub async fn initialize(&mut self) -> bool {
        if self.state != AdapterState::Uninitialized {
            return true;
        }

        match self.driver.probe().await {
            Ok(available) => {
                self.state = if available {
                    AdapterState::Available
                } else {
                    AdapterState::Unavailable
                };
                info!("Bluetooth initialized, available: {}", available);
                true
            }
            Err(e) => {
                error!("Bluetooth initialization error: {}", e);
                false
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state != AdapterState::Uninitialized
    }

    pub fn is_available(&self) -> bool {
        self.state == AdapterState::Available
    }

    /// Scans for nearby devices. Returns an empty list if Bluetooth is
    /// unavailable or the scan fails.
    pub async fn scan(&mut self, duration: Duration) -> Vec<BluetoothDevice> {
        if !self.is_available() {
            return Vec::new();
        }

        if let Err(e) = self.events.emit(AppEvent::ScanStart) {
            error!("Failed to emit scan-start event: {}", e);
        }

        let devices = match self.driver.discover(duration, &self.events).await {
            Ok(devices) => devices,
            Err(e) => {
                error!("Bluetooth scan error: {}", e);
                Vec::new()
            }
        };

        if let Err(e) = self.events.emit(AppEvent::ScanComplete {
            device_count: devices.len(),
        }) {
            error!("Failed to emit scan-complete event: {}", e);
        }
        info!("Bluetooth scan finished with {} device(s)", devices.len());
        devices
    }

    /// Builds a Bluetooth record for `device` and saves it.
    pub async fn record(&self, device: &BluetoothDevice) -> bool {
        if !self.is_available() {
            return false;
        }

        let data = json!({
            "protocol": BLUETOOTH_PROTOCOL,
            "device_class": device.device_class.as_deref().unwrap_or(UNKNOWN_DEVICE_CLASS),
            "services": [],
            "metadata": {
                "scan_time": now_timestamp(),
                "platform": self.driver.platform(),
            },
        });
        let record = SignalRecord::new(SignalProperties::Bluetooth(device.properties()), data)
            .with_name(device.name.clone());

        self.storage.save_record(&record).await
    }

    /// Replays a recorded Bluetooth signal.
    pub async fn transmit(&self, record: &SignalRecord) -> bool {
        if !self.is_available() {
            return false;
        }

        let SignalProperties::Bluetooth(target) = &record.properties else {
            warn!("Record {} is not a Bluetooth signal", record.id);
            return false;
        };

        match self.driver.transmit(target).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error transmitting Bluetooth signal: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bluetooth::driver::NoAdapter;
    use crate::model::{BluetoothProperties, InfraredProperties, SignalKind};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct MockDriver {
        available: Result<bool, String>,
        devices: Vec<BluetoothDevice>,
        fail_discovery: bool,
        transmissions: AtomicUsize,
    }

    impl MockDriver {
        fn with_devices(devices: Vec<BluetoothDevice>) -> Self {
            Self {
                available: Ok(true),
                devices,
                fail_discovery: false,
                transmissions: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BluetoothDriver for MockDriver {
        fn platform(&self) -> &str {
            "mock"
        }

        async fn probe(&self) -> Result<bool> {
            self.available.clone().map_err(|e| anyhow!(e))
        }

        async fn discover(&self, _duration: Duration, events: &EventSink) -> Result<Vec<BluetoothDevice>> {
            if self.fail_discovery {
                return Err(anyhow!("adapter went away"));
            }
            for device in &self.devices {
                events.emit(AppEvent::DeviceFound(device.clone()))?;
            }
            Ok(self.devices.clone())
        }

        async fn transmit(&self, _target: &BluetoothProperties) -> Result<()> {
            self.transmissions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn speaker() -> BluetoothDevice {
        BluetoothDevice::new(
            "dev-1".into(),
            "Speaker".into(),
            "AA:BB:CC:DD:EE:FF".into(),
            -55,
            false,
        )
    }

    async fn storage() -> (TempDir, StorageService) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::open(dir.path().join("signals.db")).await;
        (dir, storage)
    }

    #[tokio::test]
    async fn test_unavailable_adapter() {
        let (_dir, storage) = storage().await;
        let mut service = BluetoothService::new(Arc::new(NoAdapter), storage.clone(), EventSink::disabled());
        service.initialize().await;

        assert!(service.is_initialized());
        assert!(!service.is_available());
        assert!(service.scan(Duration::from_millis(10)).await.is_empty());
        assert!(!service.record(&speaker()).await);
        assert!(storage.get_all_records(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_probe_error_allows_retry() {
        let (_dir, storage) = storage().await;
        let mut driver = MockDriver::with_devices(vec![]);
        driver.available = Err("permission denied".into());
        let mut service = BluetoothService::new(Arc::new(driver), storage, EventSink::disabled());

        assert!(!service.initialize().await);
        assert!(!service.is_initialized());
        assert!(!service.is_available());
    }

    #[tokio::test]
    async fn test_scan_emits_events() {
        let (_dir, storage) = storage().await;
        let (events, mut rx) = EventSink::channel();
        let driver = MockDriver::with_devices(vec![speaker()]);
        let mut service = BluetoothService::new(Arc::new(driver), storage, events);
        service.initialize().await;

        let devices = service.scan(Duration::from_millis(10)).await;
        assert_eq!(devices, vec![speaker()]);

        assert!(matches!(rx.try_recv(), Ok(AppEvent::ScanStart)));
        assert!(matches!(rx.try_recv(), Ok(AppEvent::DeviceFound(d)) if d.id == "dev-1"));
        assert!(matches!(rx.try_recv(), Ok(AppEvent::ScanComplete { device_count: 1 })));
    }

    #[tokio::test]
    async fn test_scan_failure_is_empty() {
        let (_dir, storage) = storage().await;
        let mut driver = MockDriver::with_devices(vec![speaker()]);
        driver.fail_discovery = true;
        let mut service = BluetoothService::new(Arc::new(driver), storage, EventSink::disabled());
        service.initialize().await;

        assert!(service.scan(Duration::from_millis(10)).await.is_empty());
    }

    #[tokio::test]
    async fn test_record_persists_device() {
        let (_dir, storage) = storage().await;
        let mut service = BluetoothService::new(
            Arc::new(MockDriver::with_devices(vec![speaker()])),
            storage.clone(),
            EventSink::disabled(),
        );
        service.initialize().await;

        assert!(service.record(&speaker()).await);

        let records = storage.get_all_records(Some(SignalKind::Bluetooth)).await;
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "Speaker");
        assert_eq!(record.data["protocol"], "bluetooth");
        assert_eq!(record.data["device_class"], "unknown");
        assert_eq!(record.data["metadata"]["platform"], "mock");
        assert_eq!(
            record.properties,
            SignalProperties::Bluetooth(BluetoothProperties {
                device_name: "Speaker".into(),
                address: "AA:BB:CC:DD:EE:FF".into(),
                rssi: -55,
            })
        );
    }

    #[tokio::test]
    async fn test_transmit_only_bluetooth_records() {
        let (_dir, storage) = storage().await;
        let driver = Arc::new(MockDriver::with_devices(vec![]));
        let mut service = BluetoothService::new(driver.clone(), storage, EventSink::disabled());
        service.initialize().await;

        let bluetooth = SignalRecord::new(SignalProperties::Bluetooth(speaker().properties()), json!({}));
        let infrared = SignalRecord::new(
            SignalProperties::Infrared(InfraredProperties::default()),
            json!({}),
        );

        assert!(service.transmit(&bluetooth).await);
        assert!(!service.transmit(&infrared).await);
        assert_eq!(driver.transmissions.load(Ordering::SeqCst), 1);
    }
}
