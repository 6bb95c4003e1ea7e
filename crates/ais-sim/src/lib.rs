//! AIS Traffic Simulation
//!
//! Moves simulated vessels, base stations and aids to navigation through
//! simulated time and turns the scheduler's due messages into AIVDM
//! sentences, with optional GGA/RMC own-ship fixes per vessel.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use ais_sim::{ScenarioConfig, TrafficEngine};
//!
//! let scenario = ScenarioConfig::default();
//! let mut engine = TrafficEngine::from_scenario(&scenario).unwrap();
//!
//! let sent = engine.tick(Duration::from_secs(1));
//! assert!(sent.iter().all(|t| t.sentences.iter().all(|s| s.starts_with("!AIVDM,"))));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod target;

pub use config::ScenarioConfig;
pub use engine::{EngineStats, TrafficEngine};
pub use error::SimError;
pub use generator::{build_messages, MessageGenerator, Transmission};
pub use target::{AidToNavigation, BaseStation, Movement, SimTarget, Vessel};
