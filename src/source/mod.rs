//! Reading acquisition for the vital monitor.
//!
//! This module provides the [`Reading`] record, the [`ReadingSource`]
//! abstraction the monitor loop polls, an HTTP implementation backed by the
//! relay server, and a simulator for hardware-free development.

pub mod http;
pub mod types;

// Re-export commonly used types
pub use http::{BlockingReadingClient, ReadingClient, SourceConfig};
pub use types::{Reading, ReadingSource, SimulatedSource, SourceError};
