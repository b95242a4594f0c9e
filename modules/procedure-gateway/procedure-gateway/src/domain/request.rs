//! Call validation and `serviceParam` encoding.

use procedure_gateway_sdk::Presence;
use serde_json::{Number, Value};
use std::num::FpCategory;

use super::DomainError;
use crate::wire::ServiceParam;

/// Separator placed between quoted list elements.
pub const PARAM_DELIMITER: &str = "&del;";

/// Validate the procedure name; the checks run in a fixed order.
///
/// # Errors
///
/// `ProcedureNull`, `ProcedureUndefined`, or `ProcedureEmpty`.
pub fn procedure_name(procedure: &Presence<String>) -> Result<&str, DomainError> {
    match procedure {
        Presence::Null => Err(DomainError::ProcedureNull),
        Presence::Missing => Err(DomainError::ProcedureUndefined),
        Presence::Present(name) if name.trim().is_empty() => Err(DomainError::ProcedureEmpty),
        Presence::Present(name) => Ok(name),
    }
}

/// Encode call parameters as `serviceParam`.
///
/// A list becomes `'a'&del;'b'` (elements are not escaped), a string is sent
/// as-is, and a number stays a JSON number.
///
/// # Errors
///
/// Absent or null parameters, booleans, objects, and lists holding anything
/// other than strings and numbers.
pub fn encode_parameters(parameters: &Presence<Value>) -> Result<ServiceParam, DomainError> {
    let value = match parameters {
        Presence::Missing => return Err(DomainError::ParametersUndefined),
        Presence::Null => return Err(DomainError::ParametersNull),
        Presence::Present(value) => value,
    };

    match value {
        Value::Array(items) => encode_list(items).map(ServiceParam::Text),
        Value::String(s) => Ok(ServiceParam::Text(s.clone())),
        Value::Number(n) => Ok(ServiceParam::Number(n.clone())),
        other => Err(DomainError::UnsupportedParameter {
            kind: kind_of(other),
        }),
    }
}

fn encode_list(items: &[Value]) -> Result<String, DomainError> {
    let quoted = items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(format!("'{s}'")),
            Value::Number(n) => Ok(format!("'{}'", render_number(n))),
            other => Err(DomainError::UnsupportedListElement {
                index,
                kind: kind_of(other),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(quoted.join(PARAM_DELIMITER))
}

/// Rendered like JavaScript's `String(n)`: shortest round-trip digits,
/// integral floats without a fraction (`3.0` -> `3`), and exponent form
/// outside `[1e-6, 1e21)` (`1e+21`, `1.5e-7`).
fn render_number(n: &Number) -> String {
    let Some(f) = n.as_f64().filter(|_| n.is_f64()) else {
        return n.to_string();
    };
    if f.classify() == FpCategory::Zero {
        return "0".to_owned();
    }
    let magnitude = f.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return f.to_string();
    }
    let exponential = format!("{f:e}");
    match exponential.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exponential,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
