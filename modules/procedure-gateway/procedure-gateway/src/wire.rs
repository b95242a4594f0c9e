//! JSON shapes exchanged with the PDA service host.

use procedure_gateway_sdk::{EndpointTag, Presence, ProcedureCall, ResultShape};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `serviceParam`: a delimited string or a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServiceParam {
    Text(String),
    Number(serde_json::Number),
}

/// Request body for every procedure endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest<'a> {
    #[serde(rename = "userID")]
    pub user_id: Option<&'a str>,
    pub user_plant: Option<&'a str>,
    #[serde(rename = "serviceID")]
    pub service_id: &'a str,
    pub service_param: &'a ServiceParam,
    pub service_caller_event_type: &'a str,
    pub service_caller_event_name: &'a str,
    pub client_network_type: &'a str,
}

/// Dictionary request; it carries no `userID`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryRequest<'a> {
    pub user_plant: Option<&'a str>,
    #[serde(rename = "serviceID")]
    pub service_id: &'a str,
    pub service_param: &'a str,
    pub service_caller_event_type: &'a str,
    pub service_caller_event_name: &'a str,
    pub client_network_type: &'a str,
}

/// Response envelope. Absent status fields read as null.
///
/// Every field is read leniently so a status message is never lost to a
/// malformed `returnValue`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEnvelope {
    #[serde(default, deserialize_with = "status_text")]
    pub return_error_msg: Option<String>,
    #[serde(default, deserialize_with = "status_text")]
    pub return_user_message: Option<String>,
    /// Kept raw; should be an array of strings holding JSON row arrays.
    #[serde(default)]
    pub return_value: Option<Value>,
}

/// A status field that is a string, or any other non-null JSON rendered as text.
fn status_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// One element of the GETDATE response array.
#[derive(Debug, Clone, Deserialize)]
pub struct ClockEntry {
    pub value: Value,
}

/// A call described as JSON, e.g. `{"procedure": "USP_X", "parameters": ["A"]}`.
///
/// Absent and `null` fields stay distinguishable so the call validates the
/// same way a programmatic one would.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CallDescription {
    #[serde(deserialize_with = "tri_state")]
    pub procedure: Presence<String>,
    #[serde(deserialize_with = "tri_state")]
    pub parameters: Presence<Value>,
    #[serde(deserialize_with = "tri_state")]
    pub endpoint: Presence<String>,
    pub event_type: String,
    pub event_name: String,
    pub multiple: bool,
    pub user_message_is_error: Option<bool>,
    pub void_procedure: bool,
    pub verbose: bool,
}

fn tri_state<'de, D, T>(deserializer: D) -> Result<Presence<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Presence::from_option)
}

impl From<CallDescription> for ProcedureCall {
    fn from(desc: CallDescription) -> Self {
        // An absent selector takes the builder default.
        let endpoint = match desc.endpoint {
            Presence::Missing => Presence::Present(EndpointTag::General.as_str().to_owned()),
            other => other,
        };
        Self {
            procedure: desc.procedure,
            parameters: desc.parameters,
            endpoint,
            event_type: desc.event_type,
            event_name: desc.event_name,
            result_shape: if desc.multiple {
                ResultShape::Multiple
            } else {
                ResultShape::Single
            },
            user_message_is_error: desc.user_message_is_error.unwrap_or(true),
            void_procedure: desc.void_procedure,
            verbose: desc.verbose,
        }
    }
}

/// Parse a JSON call description.
///
/// # Errors
///
/// Returns the `serde_json` error for malformed JSON, unknown fields, or
/// fields of the wrong type.
pub fn parse_call(json: &str) -> Result<ProcedureCall, serde_json::Error> {
    serde_json::from_str::<CallDescription>(json).map(ProcedureCall::from)
}
