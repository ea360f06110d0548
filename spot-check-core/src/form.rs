use crate::model::{ForecastToggles, FormFields};

/// Validity of each configuration field, and whether the form may be submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormValidity {
    name_valid: bool,
    days_valid: bool,
    forecast_valid: bool,
}

impl FormValidity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update spot name validity from the raw text. Returns the new submit state.
    pub fn set_spot_name(&mut self, text: &str) -> bool {
        self.name_valid = !text.is_empty();
        self.submit_enabled()
    }

    /// Update number-of-days validity. Only presence is checked.
    pub fn set_number_of_days(&mut self, text: &str) -> bool {
        self.days_valid = !text.is_empty();
        self.submit_enabled()
    }

    pub fn set_forecast(&mut self, toggles: ForecastToggles) -> bool {
        self.forecast_valid = toggles.any();
        self.submit_enabled()
    }

    /// Recompute all three flags from a complete set of field values.
    pub fn revalidate(&mut self, fields: &FormFields) -> bool {
        self.set_spot_name(&fields.spot_name);
        self.set_number_of_days(&fields.number_of_days);
        self.set_forecast(fields.forecast)
    }

    pub fn name_valid(&self) -> bool {
        self.name_valid
    }

    pub fn days_valid(&self) -> bool {
        self.days_valid
    }

    pub fn forecast_valid(&self) -> bool {
        self.forecast_valid
    }

    pub fn submit_enabled(&self) -> bool {
        self.name_valid && self.days_valid && self.forecast_valid
    }
}
