//! Request handling for the JSON-lines protocol
//!
//! Requests:
//! - parse: Read quantity text of a kind, optionally with a default unit
//! - format: Render a value in a unit with a quantity format
//! - verify: Check a quantity format for a kind
//! - units: List kinds, or the units of one kind

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use gauge_core::{Culture, GaugeError};
use gauge_units::{Quantity, QuantityKind, SymbolFormat, UnitInput, UNITS};
use crate::config::Config;

/// Codes for failures outside the quantity engine
pub mod codes {
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const UNKNOWN_KIND: &str = "UNKNOWN_KIND";
    pub const UNKNOWN_CULTURE: &str = "UNKNOWN_CULTURE";
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Parse {
        kind: String,
        text: String,
        /// Unit for bare numbers; without it a symbol is required
        unit: Option<String>,
        input: Option<UnitInput>,
        culture: Option<String>,
    },
    Format {
        kind: String,
        value: f64,
        unit: String,
        format: Option<String>,
        symbol_format: Option<SymbolFormat>,
        culture: Option<String>,
    },
    Verify {
        kind: String,
        format: String,
    },
    Units {
        kind: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorBody {
    fn new(code: &str, message: impl Into<String>) -> Self {
        ErrorBody {
            code: code.to_string(),
            message: message.into(),
            suggestion: None,
        }
    }
}

impl From<GaugeError> for ErrorBody {
    fn from(err: GaugeError) -> Self {
        ErrorBody {
            code: err.code().to_string(),
            message: err.to_string(),
            suggestion: Some(err.suggestion()),
        }
    }
}

impl Response {
    pub fn success(result: JsonValue) -> Self {
        Response { ok: true, result: Some(result), error: None }
    }

    pub fn failure(error: ErrorBody) -> Self {
        Response { ok: false, result: None, error: Some(error) }
    }
}

/// Handle one protocol line
pub fn handle_line(line: &str, config: &Config) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "malformed request");
            return Response::failure(ErrorBody::new(codes::BAD_REQUEST, format!("Malformed request: {}", e)));
        }
    };

    match handle_request(&request, config) {
        Ok(result) => Response::success(result),
        Err(error) => {
            tracing::debug!(code = %error.code, "request failed");
            Response::failure(error)
        }
    }
}

pub fn handle_request(request: &Request, config: &Config) -> Result<JsonValue, ErrorBody> {
    match request {
        Request::Parse { kind, text, unit, input, culture } => {
            let kind = kind_named(kind)?;
            let culture = culture_named(culture.as_deref(), config)?;
            let quantity = match unit {
                Some(unit) => {
                    let default_unit = UNITS.parse_unit(unit, kind)?;
                    let input = input.unwrap_or(config.unit_input);
                    UNITS.try_parse_quantity(text, default_unit, input, culture)?
                }
                None => UNITS.parse_quantity(text, kind, config.styles(), culture)?,
            };
            Ok(quantity_json(&quantity))
        }
        Request::Format { kind, value, unit, format, symbol_format, culture } => {
            let kind = kind_named(kind)?;
            let culture = culture_named(culture.as_deref(), config)?;
            let quantity = Quantity::new(*value, UNITS.parse_unit(unit, kind)?);

            let text = match symbol_format {
                Some(symbol_format) => {
                    let format = UNITS.cache().get_or_create_for_unit(format.as_deref(), quantity.unit, *symbol_format);
                    reject_invalid(format.error())?;
                    quantity.format(&format, culture)
                }
                None => {
                    let format = UNITS.format(kind, format.as_deref());
                    reject_invalid(format.error())?;
                    quantity.format(&format, culture)
                }
            };
            Ok(json!({ "text": text }))
        }
        Request::Verify { kind, format } => {
            let kind = kind_named(kind)?;
            let parsed = UNITS.format(kind, Some(format));
            reject_invalid(parsed.error())?;
            Ok(json!({
                "valid": true,
                "composite": parsed.composite_format(),
                "value_format": parsed.value_format(),
                "unit": parsed.unit().map(|u| u.symbol),
            }))
        }
        Request::Units { kind: Some(kind) } => {
            let kind = kind_named(kind)?;
            Ok(json!({
                "kind": kind,
                "si_unit": UNITS.si_unit(kind).map(|u| u.symbol),
                "units": UNITS.units(kind),
            }))
        }
        Request::Units { kind: None } => {
            let kinds: Vec<JsonValue> = UNITS
                .kinds()
                .into_iter()
                .map(|kind| json!({
                    "kind": kind,
                    "si_unit": UNITS.si_unit(kind).map(|u| u.symbol),
                }))
                .collect();
            Ok(json!({ "kinds": kinds }))
        }
    }
}

fn quantity_json(quantity: &Quantity) -> JsonValue {
    json!({
        "value": quantity.value,
        "unit": quantity.unit.symbol,
        "kind": quantity.kind(),
        "si_value": quantity.si_value(),
        "text": quantity.to_string(),
    })
}

fn reject_invalid(error: Option<&GaugeError>) -> Result<(), ErrorBody> {
    match error {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

fn kind_named(name: &str) -> Result<QuantityKind, ErrorBody> {
    UNITS.kind_by_name(name).ok_or_else(|| ErrorBody {
        suggestion: Some(format!(
            "Use one of: {}",
            QuantityKind::ALL.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
        )),
        ..ErrorBody::new(codes::UNKNOWN_KIND, format!("Unknown quantity kind '{}'", name))
    })
}

fn culture_named(name: Option<&str>, config: &Config) -> Result<&'static Culture, ErrorBody> {
    match name {
        None => Ok(config.culture),
        Some(name) => Culture::get(name).ok_or_else(|| ErrorBody {
            suggestion: Some(format!("Use 'invariant' or one of: {}", Culture::names().join(", "))),
            ..ErrorBody::new(codes::UNKNOWN_CULTURE, format!("Unknown culture '{}'", name))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_core::codes as gauge_codes;

    fn handle(line: &str) -> Response {
        handle_line(line, &Config::default())
    }

    fn result(line: &str) -> JsonValue {
        let response = handle(line);
        assert!(response.ok, "{:?}", response.error);
        response.result.unwrap()
    }

    fn error(line: &str) -> ErrorBody {
        let response = handle(line);
        assert!(!response.ok);
        response.error.unwrap()
    }

    #[test]
    fn test_parse_with_symbol() {
        let result = result(r#"{"op":"parse","kind":"MassFlow","text":"12.5 kg/s"}"#);
        assert_eq!(result["value"], 12.5);
        assert_eq!(result["unit"], "kg/s");
        assert_eq!(result["kind"], "MassFlow");
        assert_eq!(result["text"], "12.5\u{00A0}kg/s");
    }

    #[test]
    fn test_parse_with_default_unit_and_culture() {
        let result = result(r#"{"op":"parse","kind":"Length","text":"12,5","unit":"mm","culture":"sv-SE"}"#);
        assert_eq!(result["value"], 12.5);
        assert_eq!(result["unit"], "mm");
    }

    #[test]
    fn test_parse_scalar_only_rejects_symbol() {
        let err = error(r#"{"op":"parse","kind":"Length","text":"12.5 cm","unit":"mm","input":"ScalarOnly"}"#);
        assert_eq!(err.code, gauge_codes::UNIT_NOT_ALLOWED);
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_parse_without_unit_requires_symbol() {
        let err = error(r#"{"op":"parse","kind":"Length","text":"12.5"}"#);
        assert_eq!(err.code, gauge_codes::MISSING_SYMBOL);
    }

    #[test]
    fn test_parse_thousands_from_config() {
        let config = Config { allow_thousands: true, ..Config::default() };
        let response = handle_line(r#"{"op":"parse","kind":"Length","text":"1,250 mm"}"#, &config);
        assert_eq!(response.result.unwrap()["value"], 1250.0);

        let err = error(r#"{"op":"parse","kind":"Length","text":"1,250 mm"}"#);
        assert_eq!(err.code, gauge_codes::INCOMPLETE_PARSE);
    }

    #[test]
    fn test_format_converts() {
        let result = result(r#"{"op":"format","kind":"Length","value":1.5,"unit":"m","format":"F2 mm"}"#);
        assert_eq!(result["text"], "1500.00 mm");
    }

    #[test]
    fn test_format_with_symbol_format() {
        let result = result(r#"{"op":"format","kind":"Speed","value":2,"unit":"m/s","format":"F1","symbol_format":"SignedSuperScript"}"#);
        assert_eq!(result["text"], "2.0\u{00A0}m⋅s⁻¹");
    }

    #[test]
    fn test_format_invalid() {
        let err = error(r#"{"op":"format","kind":"Length","value":1.5,"unit":"m","format":"F2 kgx"}"#);
        assert_eq!(err.code, gauge_codes::MALFORMED_FORMAT);
        assert!(err.message.starts_with("Invalid format: 'F2 kgx' cannot be used to format LengthUnit"));
    }

    #[test]
    fn test_verify() {
        let result = result(r#"{"op":"verify","kind":"Pressure","format":"F1 kPa"}"#);
        assert_eq!(result["valid"], true);
        assert_eq!(result["unit"], "kPa");
        assert_eq!(result["value_format"], "F1");

        let err = error(r#"{"op":"verify","kind":"Pressure","format":"Q9 kPa"}"#);
        assert_eq!(err.code, gauge_codes::MALFORMED_FORMAT);
    }

    #[test]
    fn test_units() {
        let temperature = result(r#"{"op":"units","kind":"temperature"}"#);
        assert_eq!(temperature["kind"], "Temperature");
        assert_eq!(temperature["si_unit"], "K");
        let symbols: Vec<&str> = temperature["units"]
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["symbol"].as_str().unwrap())
            .collect();
        assert!(symbols.contains(&"°C"));

        let all = result(r#"{"op":"units"}"#);
        assert_eq!(all["kinds"].as_array().unwrap().len(), QuantityKind::ALL.len());
    }

    #[test]
    fn test_request_errors() {
        assert_eq!(error("not json").code, codes::BAD_REQUEST);
        assert_eq!(error(r#"{"op":"explode"}"#).code, codes::BAD_REQUEST);
        assert_eq!(error(r#"{"op":"units","kind":"Volts"}"#).code, codes::UNKNOWN_KIND);
        let err = error(r#"{"op":"parse","kind":"Length","text":"1 m","culture":"xx"}"#);
        assert_eq!(err.code, codes::UNKNOWN_CULTURE);
    }

    #[test]
    fn test_response_shape() {
        let ok = serde_json::to_value(Response::success(json!(1))).unwrap();
        assert_eq!(ok, json!({ "ok": true, "result": 1 }));

        let failed = serde_json::to_value(handle(r#"{"op":"parse","kind":"Length","text":"x"}"#)).unwrap();
        assert_eq!(failed["ok"], false);
        assert_eq!(failed["error"]["code"], gauge_codes::INVALID_NUMBER);
        assert!(failed.get("result").is_none());
    }
}
