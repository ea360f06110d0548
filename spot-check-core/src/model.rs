use serde::Serialize;

/// A category of forecast data the device can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastType {
    Swell,
    Tides,
}

impl ForecastType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastType::Swell => "swell",
            ForecastType::Tides => "tides",
        }
    }

    /// All forecast types, in the order the device expects them.
    pub const fn all() -> &'static [ForecastType] {
        &[ForecastType::Swell, ForecastType::Tides]
    }
}

impl std::fmt::Display for ForecastType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ForecastType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "swell" => Ok(ForecastType::Swell),
            "tides" => Ok(ForecastType::Tides),
            _ => Err(anyhow::anyhow!(
                "Unknown forecast type '{value}'. Supported forecast types: swell, tides."
            )),
        }
    }
}

/// On/off state of the two forecast switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForecastToggles {
    pub swell: bool,
    pub tides: bool,
}

impl ForecastToggles {
    pub fn is_enabled(&self, kind: ForecastType) -> bool {
        match kind {
            ForecastType::Swell => self.swell,
            ForecastType::Tides => self.tides,
        }
    }

    pub fn enable(&mut self, kind: ForecastType) {
        match kind {
            ForecastType::Swell => self.swell = true,
            ForecastType::Tides => self.tides = true,
        }
    }

    pub fn any(&self) -> bool {
        self.swell || self.tides
    }

    /// Enabled types, swell before tides.
    pub fn enabled_types(&self) -> Vec<ForecastType> {
        ForecastType::all()
            .iter()
            .copied()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

impl FromIterator<ForecastType> for ForecastToggles {
    fn from_iter<I: IntoIterator<Item = ForecastType>>(iter: I) -> Self {
        let mut toggles = ForecastToggles::default();
        for kind in iter {
            toggles.enable(kind);
        }
        toggles
    }
}

/// Current values of the configuration form, as shown by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub spot_name: String,
    pub number_of_days: String,
    pub forecast: ForecastToggles,
}

impl FormFields {
    /// Whether every field holds a value the device will accept.
    pub fn is_complete(&self) -> bool {
        !self.spot_name.is_empty() && !self.number_of_days.is_empty() && self.forecast.any()
    }

    /// Merge a decoded device response into these fields.
    ///
    /// Absent values leave the field alone; forecast switches are only turned on.
    pub fn apply_update(&mut self, update: &FieldUpdate) {
        if let Some(days) = &update.number_of_days {
            self.number_of_days = days.clone();
        }
        if let Some(name) = &update.spot_name {
            self.spot_name = name.clone();
        }
        for kind in &update.forecast_types {
            self.forecast.enable(*kind);
        }
    }
}

/// What a `current_configuration` response had to say about each field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    pub spot_name: Option<String>,
    pub number_of_days: Option<String>,
    pub forecast_types: Vec<ForecastType>,
    /// Forecast type names the device reported that this client does not know.
    pub unrecognized: Vec<String>,
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        self.spot_name.is_none() && self.number_of_days.is_none() && self.forecast_types.is_empty()
    }
}
