//! JSON bodies exchanged with the device's two endpoints.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::model::{FieldUpdate, ForecastType, FormFields};

pub const CURRENT_CONFIGURATION_PATH: &str = "current_configuration";
pub const CONFIGURE_PATH: &str = "configure";
pub const CONTENT_TYPE_JSON: &str = "application/json";

const NUMBER_OF_DAYS_KEY: &str = "number_of_days";
const SPOT_NAME_KEY: &str = "spot_name";
const FORECAST_TYPES_KEY: &str = "forecast_types";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response body is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Body of `POST configure`.
#[derive(Debug, Serialize)]
struct ConfigureBody<'a> {
    number_of_days: &'a str,
    spot_name: &'a str,
    forecast_types: Vec<ForecastType>,
}

/// Serialize form values into the `configure` request body.
pub fn encode_configure(fields: &FormFields) -> Result<Vec<u8>, serde_json::Error> {
    let body = ConfigureBody {
        number_of_days: &fields.number_of_days,
        spot_name: &fields.spot_name,
        forecast_types: fields.forecast.enabled_types(),
    };

    serde_json::to_vec_pretty(&body)
}

/// Decode a `current_configuration` response.
///
/// Only the top-level shape can fail. Keys holding the wrong JSON type and
/// unknown forecast types are logged and skipped.
pub fn decode_current_configuration(body: &[u8]) -> Result<FieldUpdate, DecodeError> {
    let value: Value = serde_json::from_slice(body)?;
    let Value::Object(object) = value else {
        return Err(DecodeError::NotAnObject(json_kind(&value)));
    };

    let mut update = FieldUpdate {
        number_of_days: string_field(&object, NUMBER_OF_DAYS_KEY),
        spot_name: string_field(&object, SPOT_NAME_KEY),
        ..FieldUpdate::default()
    };

    if let Some(names) = string_array_field(&object, FORECAST_TYPES_KEY) {
        for name in names {
            match ForecastType::try_from(name) {
                Ok(kind) => update.forecast_types.push(kind),
                Err(_) => {
                    warn!(forecast_type = name, "device reported an unsupported forecast type");
                    update.unrecognized.push(name.to_owned());
                }
            }
        }
    }

    Ok(update)
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        other => {
            warn!(key, found = json_kind(other), "ignoring non-string configuration value");
            None
        }
    }
}

fn string_array_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<Vec<&'a str>> {
    let value = object.get(key)?;
    let strings = value
        .as_array()
        .and_then(|items| items.iter().map(Value::as_str).collect::<Option<Vec<_>>>());

    if strings.is_none() {
        warn!(key, found = json_kind(value), "ignoring configuration value that is not a list of strings");
    }
    strings
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
