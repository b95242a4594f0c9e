//! Public models for the procedure gateway.
//!
//! Transport-agnostic types describing a procedure call, the caller it is
//! made on behalf of, and the decoded outcome.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One decoded result row: column name to value, in server order.
pub type Row = serde_json::Map<String, Value>;

/// Translation dictionary: source text to translated text.
pub type Dictionary = BTreeMap<String, String>;

/// A caller-supplied value that may be absent, explicitly null, or present.
///
/// Absent and null are rejected with different messages, so `Option` is not
/// enough to describe call inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence<T> {
    /// The field was not supplied at all.
    Missing,
    /// The field was supplied as null.
    Null,
    Present(T),
}

impl<T> Presence<T> {
    /// `None` maps to `Null`; use `Presence::Missing` for an absent field.
    #[must_use]
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Present)
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[must_use]
    pub fn as_ref(&self) -> Presence<&T> {
        match self {
            Self::Missing => Presence::Missing,
            Self::Null => Presence::Null,
            Self::Present(v) => Presence::Present(v),
        }
    }

    #[must_use]
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(v) => Some(v),
            Self::Missing | Self::Null => None,
        }
    }
}

impl<T> Default for Presence<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> From<T> for Presence<T> {
    fn from(value: T) -> Self {
        Self::Present(value)
    }
}

/// Server endpoint a call is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointTag {
    General,
    Output,
    OutputFront,
    #[serde(rename = "GETDATE")]
    GetDate,
}

impl EndpointTag {
    pub const ALL: [Self; 4] = [Self::General, Self::Output, Self::OutputFront, Self::GetDate];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Output => "OUTPUT",
            Self::OutputFront => "OUTPUT_FRONT",
            Self::GetDate => "GETDATE",
        }
    }

    /// Case-insensitive lookup of a selector string.
    #[must_use]
    pub fn parse(selector: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(selector))
    }
}

impl fmt::Display for EndpointTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the response carries one result set or several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultShape {
    #[default]
    Single,
    Multiple,
}

/// Who a call is made on behalf of.
///
/// Absent values are sent as JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Option<String>,
    pub user_plant: Option<String>,
}

impl CallerIdentity {
    #[must_use]
    pub fn new(user_id: impl Into<String>, user_plant: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            user_plant: Some(user_plant.into()),
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// A stored-procedure invocation.
///
/// `parameters` holds the raw JSON value so that unsupported shapes reach
/// validation instead of being lost at construction. Accepted shapes are a
/// string, a number, or a list of strings and numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    pub procedure: Presence<String>,
    pub parameters: Presence<Value>,
    /// Selector string; defaults to GENERAL. Absent, null, and blank selectors are rejected.
    pub endpoint: Presence<String>,
    pub event_type: String,
    pub event_name: String,
    pub result_shape: ResultShape,
    /// Treat `returnUserMessage` as an error (default) or return it as the value.
    pub user_message_is_error: bool,
    /// Skip decoding `returnValue` on success.
    pub void_procedure: bool,
    /// Log inputs and outputs at info level for this call.
    pub verbose: bool,
}

impl Default for ProcedureCall {
    fn default() -> Self {
        Self {
            procedure: Presence::Missing,
            parameters: Presence::Missing,
            endpoint: Presence::Present(EndpointTag::General.as_str().to_owned()),
            event_type: String::new(),
            event_name: String::new(),
            result_shape: ResultShape::Single,
            user_message_is_error: true,
            void_procedure: false,
            verbose: false,
        }
    }
}

impl ProcedureCall {
    /// Start a call to `procedure`; parameters must still be supplied.
    #[must_use]
    pub fn new(procedure: impl Into<String>) -> Self {
        Self {
            procedure: Presence::Present(procedure.into()),
            ..Self::default()
        }
    }

    /// Positional parameters, sent as a quoted, delimited list.
    #[must_use]
    pub fn params<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.parameters = Presence::Present(Value::Array(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// An empty parameter list, serialized as the empty string.
    #[must_use]
    pub fn no_params(mut self) -> Self {
        self.parameters = Presence::Present(Value::Array(Vec::new()));
        self
    }

    /// A single string parameter, sent unquoted.
    #[must_use]
    pub fn text_param(mut self, value: impl Into<String>) -> Self {
        self.parameters = Presence::Present(Value::String(value.into()));
        self
    }

    /// A single numeric parameter, sent as a JSON number.
    #[must_use]
    pub fn number_param(mut self, value: impl Into<serde_json::Number>) -> Self {
        self.parameters = Presence::Present(Value::Number(value.into()));
        self
    }

    #[must_use]
    pub fn raw_params(mut self, parameters: Presence<Value>) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn endpoint(mut self, selector: impl Into<String>) -> Self {
        self.endpoint = Presence::Present(selector.into());
        self
    }

    #[must_use]
    pub fn event(mut self, event_type: impl Into<String>, event_name: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self.event_name = event_name.into();
        self
    }

    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.result_shape = ResultShape::Multiple;
        self
    }

    #[must_use]
    pub fn void(mut self) -> Self {
        self.void_procedure = true;
        self
    }

    #[must_use]
    pub fn user_message_as_value(mut self) -> Self {
        self.user_message_is_error = false;
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Decoded result of a successful call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProcedureOutcome {
    /// Single-result mode.
    Rows(Vec<Row>),
    /// Multi-result mode, in response order.
    ResultSets(Vec<Vec<Row>>),
    /// `returnUserMessage` returned as the value.
    Message(String),
    /// Void procedure; `returnValue` was not decoded.
    Void,
    /// The server reported success but `returnValue` could not be decoded.
    Unparsed { reason: String },
}

impl ProcedureOutcome {
    #[must_use]
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    #[must_use]
    pub fn result_sets(&self) -> Option<&[Vec<Row>]> {
        match self {
            Self::ResultSets(sets) => Some(sets),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unparsed(&self) -> bool {
        matches!(self, Self::Unparsed { .. })
    }
}
