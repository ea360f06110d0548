//! The configuration screen: form validity plus synchronization with the device.
//!
//! A [`ConfigScreen`] is owned by a single context (the UI loop). Device
//! requests run as spawned tasks and hand their results back through a queue
//! that only the owner drains, so every UI and validity mutation happens on
//! the owning context.

use reqwest::Method;
use std::sync::Arc;
use thiserror::Error;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, error, info, warn};

use crate::{
    Config,
    config::DEFAULT_HOST,
    form::FormValidity,
    model::{FieldUpdate, ForecastToggles},
    protocol::{
        CONFIGURE_PATH, CONTENT_TYPE_JSON, CURRENT_CONFIGURATION_PATH,
        decode_current_configuration, encode_configure,
    },
    transport::{Request, Transport, TransportError},
    ui::UiSurface,
};

pub const ERROR_TITLE: &str = "Error";
pub const SUCCESS_TITLE: &str = "Success";
pub const FETCH_FAILED_MESSAGE: &str = "Could not retrieve current Spot Check configuration saved on device, functionality to save new configuration might be broken.";
pub const DEVICE_UNREACHABLE_MESSAGE: &str =
    "Could not find Spot Check device on network, are you sure it is turned on and connected?";
pub const APPLY_SUCCEEDED_MESSAGE: &str =
    "Successfully applied new configuration to Spot Check device";
pub const INCOMPLETE_FORM_MESSAGE: &str =
    "Enter a spot name and number of days, and enable at least one forecast type.";

/// A logical request flow. At most one request per channel is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Fetch,
    Apply,
}

/// Result of a device request, waiting to be handled by the screen's owner.
#[derive(Debug)]
pub struct Completion {
    channel: Channel,
    generation: u64,
    result: Result<Vec<u8>, TransportError>,
}

impl Completion {
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

/// What handling a completion did to the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The device's configuration was merged into the form.
    Fetched(FieldUpdate),
    /// The device could not be reached; an alert was shown.
    FetchFailed,
    /// The device answered with something other than a JSON object.
    FetchUnreadable,
    Applied,
    ApplyFailed,
    /// The request had been superseded; nothing changed.
    Stale,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("spot name, number of days and at least one forecast type are required")]
    IncompleteForm,

    #[error("failed to encode configuration for the device")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenOptions {
    pub host: String,
    /// Recompute validity once a fetch has populated the fields.
    pub revalidate_after_fetch: bool,
}

impl ScreenOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.host().to_string(),
            revalidate_after_fetch: config.revalidate_after_fetch(),
        }
    }
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self { host: DEFAULT_HOST.to_string(), revalidate_after_fetch: true }
    }
}

#[derive(Debug, Default)]
struct ChannelState {
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl ChannelState {
    fn is_requesting(&self) -> bool {
        self.in_flight.is_some()
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            debug!(generation = self.generation, "cancelling outstanding request");
            handle.abort();
        }
    }

    /// Marks the channel idle if `generation` is the request currently in flight.
    fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.in_flight.is_none() {
            return false;
        }
        self.in_flight = None;
        true
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl Drop for ChannelState {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

pub struct ConfigScreen<U> {
    ui: U,
    validity: FormValidity,
    transport: Arc<dyn Transport>,
    options: ScreenOptions,
    fetch: ChannelState,
    apply: ChannelState,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl<U: UiSurface> ConfigScreen<U> {
    pub fn new(ui: U, transport: Arc<dyn Transport>, options: ScreenOptions) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            ui,
            validity: FormValidity::new(),
            transport,
            options,
            fetch: ChannelState::default(),
            apply: ChannelState::default(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn validity(&self) -> &FormValidity {
        &self.validity
    }

    pub fn is_requesting(&self, channel: Channel) -> bool {
        self.channel(channel).is_requesting()
    }

    pub fn is_busy(&self) -> bool {
        self.fetch.is_requesting() || self.apply.is_requesting()
    }

    /// Screen shown: publish the initial submit state and load the device's configuration.
    ///
    /// Must be called within a Tokio runtime.
    pub fn activate(&mut self) {
        self.notify_submit();
        self.fetch_config();
    }

    pub fn spot_name_changed(&mut self, text: &str) {
        self.validity.set_spot_name(text);
        self.notify_submit();
    }

    pub fn number_of_days_changed(&mut self, text: &str) {
        self.validity.set_number_of_days(text);
        self.notify_submit();
    }

    pub fn forecast_toggled(&mut self, toggles: ForecastToggles) {
        self.validity.set_forecast(toggles);
        self.notify_submit();
    }

    /// Request the configuration currently stored on the device.
    pub fn fetch_config(&mut self) {
        self.begin(Channel::Fetch);

        let request = Request {
            host: self.options.host.clone(),
            path: CURRENT_CONFIGURATION_PATH,
            method: Method::GET,
            body: None,
            content_type: CONTENT_TYPE_JSON,
        };
        self.dispatch(Channel::Fetch, request);
    }

    /// Send the form's current values to the device.
    ///
    /// Errors are returned only when nothing was sent; the device's answer
    /// arrives later as a [`Completion`].
    pub fn apply_config(&mut self) -> Result<(), SyncError> {
        let fields = self.ui.field_values();
        if !fields.is_complete() {
            warn!("refusing to send an incomplete configuration");
            self.ui.show_error(ERROR_TITLE, INCOMPLETE_FORM_MESSAGE);
            return Err(SyncError::IncompleteForm);
        }

        self.begin(Channel::Apply);

        let body = match encode_configure(&fields) {
            Ok(body) => body,
            Err(err) => {
                error!(error = %err, "failed to encode configuration, request not sent");
                self.refresh_controls();
                return Err(err.into());
            }
        };

        let request = Request {
            host: self.options.host.clone(),
            path: CONFIGURE_PATH,
            method: Method::POST,
            body: Some(body),
            content_type: CONTENT_TYPE_JSON,
        };
        self.dispatch(Channel::Apply, request);
        Ok(())
    }

    /// Wait for the next request to finish. Returns `None` once nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if !self.is_busy() {
            return None;
        }
        self.completions_rx.recv().await
    }

    /// Handle completions until neither channel has a request in flight.
    pub async fn run_until_idle(&mut self) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();
        while let Some(completion) = self.next_completion().await {
            match self.handle_completion(completion) {
                SyncOutcome::Stale => {}
                outcome => outcomes.push(outcome),
            }
        }
        outcomes
    }

    pub fn handle_completion(&mut self, completion: Completion) -> SyncOutcome {
        let Completion { channel, generation, result } = completion;

        if !self.channel_mut(channel).finish(generation) {
            debug!(?channel, generation, "ignoring completion of a superseded request");
            return SyncOutcome::Stale;
        }

        match channel {
            Channel::Fetch => self.on_fetched(result),
            Channel::Apply => self.on_applied(result),
        }
    }

    fn on_fetched(&mut self, result: Result<Vec<u8>, TransportError>) -> SyncOutcome {
        let body = match result {
            Ok(body) => body,
            Err(err) => {
                error!(error = ?err, "could not retrieve current configuration from device");
                self.refresh_controls();
                self.ui.show_error(ERROR_TITLE, FETCH_FAILED_MESSAGE);
                return SyncOutcome::FetchFailed;
            }
        };

        let update = match decode_current_configuration(&body) {
            Ok(update) => update,
            Err(err) => {
                warn!(
                    error = %err,
                    "could not deserialize response from device, check the '{CURRENT_CONFIGURATION_PATH}' endpoint"
                );
                self.refresh_controls();
                return SyncOutcome::FetchUnreadable;
            }
        };

        let mut fields = self.ui.field_values();
        if !update.is_empty() {
            fields.apply_update(&update);
            self.ui.set_field_values(fields.clone());
        }
        if self.options.revalidate_after_fetch {
            self.validity.revalidate(&fields);
        }

        self.refresh_controls();
        SyncOutcome::Fetched(update)
    }

    fn on_applied(&mut self, result: Result<Vec<u8>, TransportError>) -> SyncOutcome {
        self.refresh_controls();

        match result {
            Ok(_) => {
                info!("device accepted new configuration");
                self.ui.show_success(SUCCESS_TITLE, APPLY_SUCCEEDED_MESSAGE);
                SyncOutcome::Applied
            }
            Err(err) => {
                error!(error = ?err, "could not apply configuration to device");
                self.ui.show_error(ERROR_TITLE, DEVICE_UNREACHABLE_MESSAGE);
                SyncOutcome::ApplyFailed
            }
        }
    }

    /// Cancel the channel's outstanding request and lock the submit control.
    fn begin(&mut self, channel: Channel) {
        self.channel_mut(channel).cancel();
        self.ui.set_busy(true);
        self.ui.set_submit_enabled(false);
    }

    fn dispatch(&mut self, channel: Channel, request: Request) {
        let generation = {
            let state = self.channel_mut(channel);
            state.generation += 1;
            state.generation
        };
        debug!(?channel, generation, path = request.path, "starting device request");

        let transport = Arc::clone(&self.transport);
        let completions = self.completions_tx.clone();
        let handle = tokio::spawn(async move {
            // A panicking transport must still end the request.
            let call = tokio::spawn(async move { transport.request(&request).await });
            let _call_guard = AbortOnDrop(call.abort_handle());
            let result = call
                .await
                .unwrap_or_else(|source| Err(TransportError::Interrupted { source }));
            // The receiver lives as long as the screen; a closed queue means nobody is listening.
            let _ = completions.send(Completion { channel, generation, result });
        });

        self.channel_mut(channel).in_flight = Some(handle);
    }

    fn refresh_controls(&mut self) {
        self.ui.set_busy(self.is_busy());
        self.notify_submit();
    }

    fn notify_submit(&mut self) {
        let enabled = !self.is_busy() && self.validity.submit_enabled();
        self.ui.set_submit_enabled(enabled);
    }

    fn channel(&self, channel: Channel) -> &ChannelState {
        match channel {
            Channel::Fetch => &self.fetch,
            Channel::Apply => &self.apply,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut ChannelState {
        match channel {
            Channel::Fetch => &mut self.fetch,
            Channel::Apply => &mut self.apply,
        }
    }
}
