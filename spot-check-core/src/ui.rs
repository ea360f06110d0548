use crate::model::FormFields;

/// The screen the configuration form is rendered on.
///
/// All calls happen on the context that owns the [`ConfigScreen`](crate::ConfigScreen).
pub trait UiSurface {
    fn set_submit_enabled(&mut self, enabled: bool);

    /// Show or hide the activity indicator.
    fn set_busy(&mut self, busy: bool);

    /// Present a blocking, single-button error alert.
    fn show_error(&mut self, title: &str, message: &str);

    fn show_success(&mut self, title: &str, message: &str);

    fn field_values(&self) -> FormFields;

    fn set_field_values(&mut self, fields: FormFields);
}
