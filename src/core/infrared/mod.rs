//! Infrared functionality
//! Capability probing, listening sessions, recording received signals and
//! retransmitting recorded ones. Receivers sit behind [`InfraredDriver`].

mod constants;
mod driver;
mod service;
mod simulated;
mod types;

pub use constants::*;
pub use driver::{InfraredDriver, NoInfraredHardware};
pub use service::{InfraredService, ListeningSession};
pub use simulated::SimulatedInfrared;
pub use types::InfraredSignal;
