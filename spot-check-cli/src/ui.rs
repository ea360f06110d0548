use spot_check_core::{FormFields, UiSurface};

/// Renders the configuration screen as terminal output.
#[derive(Debug, Default)]
pub struct TerminalUi {
    pub fields: FormFields,
    submit_enabled: bool,
    busy: bool,
}

impl TerminalUi {
    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }
}

impl UiSurface for TerminalUi {
    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn set_busy(&mut self, busy: bool) {
        if busy && !self.busy {
            eprintln!("Contacting Spot Check device...");
        }
        self.busy = busy;
    }

    fn show_error(&mut self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }

    fn show_success(&mut self, title: &str, message: &str) {
        println!("{title}: {message}");
    }

    fn field_values(&self) -> FormFields {
        self.fields.clone()
    }

    fn set_field_values(&mut self, fields: FormFields) {
        self.fields = fields;
    }
}

pub fn render_fields(fields: &FormFields) -> String {
    let forecast = fields
        .forecast
        .enabled_types()
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>();

    format!(
        "Spot name:      {}\nNumber of days: {}\nForecast types: {}",
        or_unset(&fields.spot_name),
        or_unset(&fields.number_of_days),
        if forecast.is_empty() { "(none)".to_string() } else { forecast.join(", ") },
    )
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spot_check_core::ForecastToggles;

    #[test]
    fn render_lists_enabled_forecasts_in_order() {
        let fields = FormFields {
            spot_name: "Rincon".into(),
            number_of_days: "5".into(),
            forecast: ForecastToggles { swell: true, tides: true },
        };

        let out = render_fields(&fields);
        assert!(out.contains("Spot name:      Rincon"));
        assert!(out.contains("Forecast types: swell, tides"));
    }

    #[test]
    fn render_marks_missing_values() {
        let out = render_fields(&FormFields::default());
        assert!(out.contains("Spot name:      (not set)"));
        assert!(out.contains("Forecast types: (none)"));
    }
}
