//! Client side of the field-equipment map.
//!
//! [`MapClient`] talks to the query and config endpoints; [`ViewportSession`]
//! turns successive viewport moves into rendered snapshots, keeping only the
//! response for the most recent move.

pub mod client;
pub mod error;
pub mod session;

pub use client::{MapClient, MapConfig};
pub use error::ClientError;
pub use session::{MapSnapshot, ViewportSession};
