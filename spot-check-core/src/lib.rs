//! Core library for the `spot-check` configurator.
//!
//! This crate defines:
//! - The configuration form's validity tracking
//! - Synchronization of the form with the device (fetch and apply)
//! - The device's JSON protocol and an HTTP transport for it
//! - Client settings handling
//!
//! It is used by `spot-check-cli`, but any front end implementing [`UiSurface`]
//! can drive a [`ConfigScreen`].

pub mod config;
pub mod form;
pub mod model;
pub mod protocol;
pub mod screen;
pub mod transport;
pub mod ui;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use form::FormValidity;
pub use model::{FieldUpdate, ForecastToggles, ForecastType, FormFields};
pub use screen::{Channel, ConfigScreen, ScreenOptions, SyncError, SyncOutcome};
pub use transport::{Request, Transport, TransportError, http::HttpTransport};
pub use ui::UiSurface;
