use pda_http::{HttpClient, HttpClientBuilder, HttpError};
use procedure_gateway_sdk::{
    CallerIdentity, Dictionary, EndpointTag, ProcedureCall, ProcedureOutcome, Row,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::decode::{decode_result_set, interpret};
use super::request::{encode_parameters, procedure_name};
use super::{DomainError, EndpointTable};
use crate::config::{DictionaryConfig, ProcedureGatewayConfig};
use crate::datetime::{self, DateInput, RenderZone};
use crate::wire::{ClockEntry, DictionaryRequest, ServiceEnvelope, ServiceRequest};

/// Event type and name reported by dictionary requests.
const TRANSLATION_EVENT: &str = "Translation";

const DICTIONARY_ENDPOINT: &str = "DICTIONARY";

/// Procedure gateway service.
///
/// Immutable after construction; one instance serves concurrent calls.
pub struct Service {
    http: HttpClient,
    endpoints: EndpointTable,
    dictionary_url: Option<String>,
    dictionary: DictionaryConfig,
    network_type: String,
    verbose: bool,
}

impl Service {
    #[must_use]
    pub fn new(http: HttpClient, config: &ProcedureGatewayConfig) -> Self {
        Self {
            http,
            endpoints: EndpointTable::from_config(&config.endpoints),
            dictionary_url: config.endpoints.dictionary_url().map(str::to_owned),
            dictionary: config.dictionary.clone(),
            network_type: config.network_type().to_owned(),
            verbose: config.verbose,
        }
    }

    /// Build the service together with its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` if the HTTP client cannot be built (TLS roots,
    /// invalid user agent).
    pub fn from_config(config: &ProcedureGatewayConfig) -> Result<Self, HttpError> {
        let http = HttpClientBuilder::with_config(config.http_client_config()).build()?;
        Ok(Self::new(http, config))
    }

    /// Validate, send, and decode one procedure call.
    ///
    /// Validation runs before any I/O: procedure name, then parameters, then
    /// the endpoint selector.
    ///
    /// # Errors
    ///
    /// Validation errors, `Http` for transport failures and non-2xx statuses,
    /// `MalformedBody` for a non-JSON envelope, and the remote error variants.
    pub async fn invoke(
        &self,
        identity: &CallerIdentity,
        call: &ProcedureCall,
    ) -> Result<ProcedureOutcome, DomainError> {
        let procedure = procedure_name(&call.procedure)?;
        let service_param = encode_parameters(&call.parameters)?;
        let (tag, url) = self.endpoints.resolve(&call.endpoint)?;

        let body = ServiceRequest {
            user_id: identity.user_id.as_deref(),
            user_plant: identity.user_plant.as_deref(),
            service_id: procedure,
            service_param: &service_param,
            service_caller_event_type: &call.event_type,
            service_caller_event_name: &call.event_name,
            client_network_type: &self.network_type,
        };

        let verbose = self.verbose || call.verbose;
        if verbose {
            info!(procedure, endpoint = %tag, url, param = ?service_param, "calling procedure");
        } else {
            debug!(procedure, endpoint = %tag, "calling procedure");
        }

        let envelope: ServiceEnvelope = self.post(url, &body).await?;
        let outcome = interpret(envelope, call);

        match &outcome {
            Ok(ProcedureOutcome::Unparsed { reason }) => {
                warn!(procedure, reason = reason.as_str(), "procedure result could not be parsed");
            }
            Ok(result) if verbose => info!(procedure, ?result, "procedure returned"),
            Ok(_) => debug!(procedure, "procedure returned"),
            Err(e) => debug!(procedure, error = %e, "procedure reported an error"),
        }
        outcome
    }

    /// Fetch the server clock from GETDATE.
    ///
    /// Without a format key the raw `value` is returned; with one it is
    /// rendered in local time, yielding `"Invalid Date"` or `"Invalid format"`
    /// when the value or the key is unusable.
    ///
    /// # Errors
    ///
    /// `EndpointNotConfigured` without a GETDATE URL, `Http` for transport
    /// failures, and `MalformedBody` when the response has no usable `value`.
    pub async fn server_time(&self, format: Option<&str>) -> Result<String, DomainError> {
        let url = self
            .endpoints
            .url(EndpointTag::GetDate)
            .ok_or(DomainError::EndpointNotConfigured(EndpointTag::GetDate.as_str()))?;

        let entries: Vec<ClockEntry> = self.post(url, &serde_json::Map::new()).await?;
        let value = entries
            .into_iter()
            .next()
            .map(|entry| entry.value)
            .ok_or_else(|| DomainError::MalformedBody("server clock response is empty".to_owned()))?;

        let Some(format) = format else {
            debug!("server time requested without a format key");
            return match value {
                Value::String(raw) => Ok(raw),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(unexpected_clock_value(&other)),
            };
        };

        let input = match &value {
            Value::String(raw) => DateInput::Text(raw),
            Value::Number(n) => match n.as_i64() {
                Some(millis) => DateInput::EpochMillis(millis),
                None => return Ok(datetime::INVALID_DATE.to_owned()),
            },
            other => return Err(unexpected_clock_value(other)),
        };
        Ok(datetime::format_date(format, input, RenderZone::Local))
    }

    /// Fetch the translation dictionary for `language`.
    ///
    /// Returns `Ok(None)` without I/O for the configured native language, and
    /// `Ok(None)` when the server sends no `returnValue`.
    ///
    /// # Errors
    ///
    /// `EndpointNotConfigured` without a dictionary URL, `Http` for transport
    /// failures, and `MalformedBody` when the dictionary rows cannot be read.
    pub async fn translations(
        &self,
        identity: &CallerIdentity,
        language: &str,
    ) -> Result<Option<Dictionary>, DomainError> {
        if self
            .dictionary
            .native_language
            .as_deref()
            .is_some_and(|native| native.eq_ignore_ascii_case(language))
        {
            debug!(language, "native language, no dictionary needed");
            return Ok(None);
        }

        let url = self
            .dictionary_url
            .as_deref()
            .ok_or(DomainError::EndpointNotConfigured(DICTIONARY_ENDPOINT))?;

        let body = DictionaryRequest {
            user_plant: identity.user_plant.as_deref(),
            service_id: &self.dictionary.procedure,
            service_param: language,
            service_caller_event_type: TRANSLATION_EVENT,
            service_caller_event_name: TRANSLATION_EVENT,
            client_network_type: &self.network_type,
        };

        let envelope: ServiceEnvelope = self.post(url, &body).await?;
        let Some(result_sets) = envelope.return_value else {
            warn!(
                language,
                error = envelope.return_error_msg.as_deref(),
                "dictionary returned no value"
            );
            return Ok(None);
        };

        let first = result_sets
            .as_array()
            .ok_or_else(|| DomainError::MalformedBody("dictionary returnValue is not an array".to_owned()))?
            .first()
            .ok_or_else(|| DomainError::MalformedBody("dictionary returnValue is empty".to_owned()))?;
        let rows = decode_result_set(first).map_err(DomainError::MalformedBody)?;
        let dictionary = build_dictionary(rows);

        debug!(language, entries = dictionary.len(), "dictionary loaded");
        Ok(Some(dictionary))
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> Result<T, DomainError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self
            .http
            .post(url)
            .header("accept", "application/json")
            .json(body)?
            .send()
            .await?
            .checked_bytes()
            .await?;

        serde_json::from_slice(&bytes).map_err(|e| DomainError::MalformedBody(e.to_string()))
    }
}

fn unexpected_clock_value(value: &Value) -> DomainError {
    DomainError::MalformedBody(format!("unexpected server clock value: {value}"))
}

/// First property of each row, trimmed; blank keys or values and non-string
/// values are skipped.
fn build_dictionary(rows: Vec<Row>) -> Dictionary {
    rows.into_iter()
        .filter_map(|row| {
            let (key, value) = row.into_iter().next()?;
            let Value::String(value) = value else {
                return None;
            };
            let (key, value) = (key.trim(), value.trim());
            (!key.is_empty() && !value.is_empty()).then(|| (key.to_owned(), value.to_owned()))
        })
        .collect()
}
