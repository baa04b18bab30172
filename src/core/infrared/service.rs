//! Infrared service
//! Listens through an [`InfraredDriver`], records received signals and
//! retransmits recorded ones.

use std::sync::Arc;

use log::{error, info, warn};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::infrared::constants::INFRARED_PROTOCOL;
use crate::core::infrared::driver::InfraredDriver;
use crate::core::infrared::types::InfraredSignal;
use crate::events::{AppEvent, EventSink};
use crate::model::{InfraredProperties, SignalProperties, SignalRecord};
use crate::storage::StorageService;
use crate::utils::now_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiverState {
    Uninitialized,
    Unavailable,
    Available,
}

pub struct InfraredService {
    driver: Arc<dyn InfraredDriver>,
    storage: StorageService,
    state: ReceiverState,
}

impl InfraredService {
    pub fn new(driver: Arc<dyn InfraredDriver>, storage: StorageService) -> Self {
        Self {
            driver,
            storage,
            state: ReceiverState::Uninitialized,
        }
    }

    /// Probes for infrared capability and returns true once the service is
    /// initialized. A failed probe leaves it uninitialized so it can be retried.
    pub async fn initialize(&mut self) -> bool {
        if self.state != ReceiverState::Uninitialized {
            return true;
        }

        match self.driver.probe().await {
            Ok(available) => {
                self.state = if available {
                    ReceiverState::Available
                } else {
                    ReceiverState::Unavailable
                };
                info!("Infrared initialized, available: {}", available);
                true
            }
            Err(e) => {
                error!("Infrared initialization error: {}", e);
                false
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state != ReceiverState::Uninitialized
    }

    pub fn is_available(&self) -> bool {
        self.state == ReceiverState::Available
    }

    /// Starts a background listener that forwards every received signal to
    /// `events`. Returns `None` if infrared is unavailable.
    ///
    /// The session borrows the service mutably, so a second session cannot
    /// be started while the first one is alive:
    ///
    /// ```compile_fail
    /// # use signal_catcher_lib::core::infrared::InfraredService;
    /// # use signal_catcher_lib::events::EventSink;
    /// # fn demo(service: &mut InfraredService) {
    /// let first = service.start_listening(EventSink::disabled());
    /// let second = service.start_listening(EventSink::disabled());
    /// drop(first);
    /// # }
    /// ```
    pub fn start_listening(&mut self, events: EventSink) -> Option<ListeningSession<'_>> {
        if !self.is_available() {
            return None;
        }

        let cancel_token = CancellationToken::new();
        let cancel_token_for_task = cancel_token.clone();
        let driver_for_task = self.driver.clone();

        let handle = tokio::spawn(async move {
            Self::listen_task(driver_for_task, events, cancel_token_for_task).await
        });
        info!("Infrared listening task started.");

        Some(ListeningSession {
            service: self,
            cancel_token,
            handle: Some(handle),
        })
    }

    /// Background loop of a listening session. Returns how many signals were
    /// forwarded.
    async fn listen_task(
        driver: Arc<dyn InfraredDriver>,
        events: EventSink,
        cancel_token: CancellationToken,
    ) -> usize {
        if let Err(e) = events.emit(AppEvent::ListenStart) {
            error!("Failed to emit listen-start event: {}", e);
        }

        let mut forwarded = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    break;
                }
                result = driver.receive() => {
                    match result {
                        Ok(signal) => {
                            if cancel_token.is_cancelled() {
                                break;
                            }
                            if let Err(e) = events.emit(AppEvent::SignalDetected(signal)) {
                                error!("Failed to emit signal-detected event: {}", e);
                                break;
                            }
                            forwarded += 1;
                        }
                        Err(e) => {
                            error!("IR listening error: {}", e);
                            break;
                        }
                    }
                }
            }
        }

        if let Err(e) = events.emit(AppEvent::ListenStopped) {
            error!("Failed to emit listen-stopped event: {}", e);
        }
        forwarded
    }

    /// Builds an infrared record for `signal` and saves it.
    pub async fn record(&self, signal: &InfraredSignal) -> bool {
        let data = json!({
            "protocol": INFRARED_PROTOCOL,
            "frequency": signal.frequency,
            "pattern": signal.pattern,
            "metadata": {
                "record_time": now_timestamp(),
                "platform": self.driver.platform(),
                "remote_type": signal.remote_type,
            },
        });
        let record = SignalRecord::new(SignalProperties::Infrared(signal.properties()), data)
            .with_name(signal.name.clone());

        self.storage.save_record(&record).await
    }

    /// Retransmits a recorded infrared signal.
    pub async fn transmit(&self, record: &SignalRecord) -> bool {
        if !self.is_available() {
            return false;
        }

        let SignalProperties::Infrared(props) = &record.properties else {
            warn!("Record {} is not an infrared signal", record.id);
            return false;
        };
        let (frequency, pattern) = transmission_parameters(props, &record.data);

        if !self.driver.has_emitter() {
            warn!("No infrared emitter present");
            return false;
        }

        match self.driver.transmit(frequency, &pattern).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error transmitting infrared signal: {}", e);
                false
            }
        }
    }
}

/// Frequency and integer pattern to transmit. When the record's own
/// attributes are incomplete, values found in the data payload take over.
fn transmission_parameters(props: &InfraredProperties, data: &Value) -> (u32, Vec<u32>) {
    let mut frequency = props.frequency;
    let mut pattern = props.pattern.clone();

    if frequency == 0 || pattern.is_empty() {
        if let Some(value) = data.get("frequency").and_then(Value::as_f64) {
            frequency = value as u32;
        }
        if let Some(entries) = data.get("pattern").and_then(Value::as_array) {
            pattern = entries
                .iter()
                .filter_map(Value::as_f64)
                .map(|interval| interval as u32)
                .collect();
        }
    }

    (frequency, pattern)
}

/// An active listening session. Dropping it cancels the background task;
/// [`ListeningSession::stop`] also waits for the task to finish.
pub struct ListeningSession<'a> {
    service: &'a mut InfraredService,
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<usize>>,
}

impl ListeningSession<'_> {
    /// Records a signal received during this session.
    pub async fn record(&self, signal: &InfraredSignal) -> bool {
        self.service.record(signal).await
    }

    pub fn is_active(&self) -> bool {
        !self.cancel_token.is_cancelled()
            && self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops listening and returns how many signals were forwarded.
    pub async fn stop(mut self) -> usize {
        info!("Stopping infrared listening.");
        self.cancel_token.cancel();

        match self.handle.take() {
            Some(handle) => match handle.await {
                Ok(forwarded) => forwarded,
                Err(e) => {
                    error!("Listening task finished with an unexpected join error: {:?}", e);
                    0
                }
            },
            None => 0,
        }
    }
}

impl Drop for ListeningSession<'_> {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
