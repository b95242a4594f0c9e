//! Response envelope interpretation.
//!
//! Precedence: `returnErrorMsg`, then `returnUserMessage`, then the void flag,
//! then `returnValue` decoding. Decoding never fails the call: anything that
//! cannot be read becomes [`ProcedureOutcome::Unparsed`].

use procedure_gateway_sdk::{ProcedureCall, ProcedureOutcome, ResultShape, Row};
use serde_json::Value;

use super::DomainError;
use crate::wire::ServiceEnvelope;

/// Turn an envelope into the call's outcome.
///
/// # Errors
///
/// `RemoteError` for `returnErrorMsg`; `RemoteUserMessage` for
/// `returnUserMessage` when the call treats it as an error.
pub fn interpret(
    envelope: ServiceEnvelope,
    call: &ProcedureCall,
) -> Result<ProcedureOutcome, DomainError> {
    if let Some(message) = envelope.return_error_msg {
        return Err(DomainError::RemoteError(message));
    }

    if let Some(message) = envelope.return_user_message {
        return if call.user_message_is_error {
            Err(DomainError::RemoteUserMessage(message))
        } else {
            Ok(ProcedureOutcome::Message(message))
        };
    }

    if call.void_procedure {
        return Ok(ProcedureOutcome::Void);
    }

    Ok(
        decode_return_value(envelope.return_value.as_ref(), call.result_shape)
            .unwrap_or_else(|reason| ProcedureOutcome::Unparsed { reason }),
    )
}

fn decode_return_value(
    return_value: Option<&Value>,
    shape: ResultShape,
) -> Result<ProcedureOutcome, String> {
    let elements = match return_value {
        None => return Err("returnValue is missing".to_owned()),
        Some(Value::Array(elements)) => elements,
        Some(_) => return Err("returnValue is not an array".to_owned()),
    };

    match shape {
        ResultShape::Single => {
            let first = elements
                .first()
                .ok_or_else(|| "returnValue is empty".to_owned())?;
            decode_result_set(first)
                .map(ProcedureOutcome::Rows)
                .map_err(|reason| format!("returnValue[0]: {reason}"))
        }
        ResultShape::Multiple => elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                decode_result_set(element).map_err(|reason| format!("returnValue[{i}]: {reason}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ProcedureOutcome::ResultSets),
    }
}

/// Decode one `returnValue` element (a string holding a JSON row array).
///
/// # Errors
///
/// A reason string when the element is not a string, not JSON, or not an
/// array of objects.
pub fn decode_result_set(element: &Value) -> Result<Vec<Row>, String> {
    let Value::String(encoded) = element else {
        return Err("expected a JSON-encoded string".to_owned());
    };

    let parsed: Value = serde_json::from_str(encoded).map_err(|e| e.to_string())?;
    let Value::Array(items) = parsed else {
        return Err("expected an array of rows".to_owned());
    };

    let rows = items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => Ok(row),
            _ => Err("expected every row to be an object".to_owned()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(normalize_sentinel(rows))
}

/// The server answers an empty query with one row of blank strings; map that
/// row to an empty result.
#[must_use]
pub fn normalize_sentinel(rows: Vec<Row>) -> Vec<Row> {
    match rows.as_slice() {
        [only] if only.values().all(is_blank) => Vec::new(),
        _ => rows,
    }
}

/// Blank the way a cell renders as text: whitespace-only strings, and lists
/// that render empty (`[]`, `[""]`, `[null]`, nested alike). A bare null or
/// number is never blank.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => match items.as_slice() {
            [] => true,
            [only] => only.is_null() || is_blank(only),
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: &Value) -> ServiceEnvelope {
        serde_json::from_value(value.clone()).unwrap()
    }

    fn single() -> ProcedureCall {
        ProcedureCall::new("USP_TEST").no_params()
    }

    fn row(value: &Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn sentinel_row_becomes_empty() {
        let env = envelope(&json!({"returnErrorMsg": null, "returnUserMessage": null,
                                   "returnValue": ["[{\"col\":\"\"}]"]}));
        assert_eq!(interpret(env, &single()).unwrap(), ProcedureOutcome::Rows(vec![]));
    }

    #[test]
    fn real_row_is_kept() {
        let env = envelope(&json!({"returnValue": ["[{\"col\":\"x\"}]"]}));
        assert_eq!(
            interpret(env, &single()).unwrap(),
            ProcedureOutcome::Rows(vec![row(&json!({"col": "x"}))])
        );
    }

    #[test]
    fn columns_keep_server_order() {
        let rows = decode_result_set(&json!(r#"[{"WORD":"Save","TRANSLATED":"Speichern","A":"1"}]"#))
            .unwrap();
        let columns: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(columns, ["WORD", "TRANSLATED", "A"]);
    }

    #[test]
    fn whitespace_only_values_are_blank() {
        let rows = vec![row(&json!({"a": "  ", "b": "\t"}))];
        assert!(normalize_sentinel(rows).is_empty());
    }

    #[test]
    fn non_string_values_are_never_blank() {
        for value in [json!(0), json!(false), json!(null)] {
            let rows = vec![row(&json!({"a": "", "b": value}))];
            assert_eq!(normalize_sentinel(rows.clone()), rows);
        }
    }

    #[test]
    fn lists_that_render_empty_are_blank() {
        let rows = vec![row(&json!({"a": [], "b": [" "], "c": [null], "d": [[]]}))];
        assert!(normalize_sentinel(rows).is_empty());

        let rows = vec![row(&json!({"a": "", "b": ["", ""]}))];
        assert_eq!(normalize_sentinel(rows.clone()), rows);
    }

    #[test]
    fn sentinel_needs_exactly_one_row() {
        let rows = vec![row(&json!({"a": ""})), row(&json!({"a": ""}))];
        assert_eq!(normalize_sentinel(rows.clone()).len(), 2);
    }

    #[test]
    fn multi_result_applies_sentinel_per_set() {
        let env = envelope(&json!({"returnValue": ["[{\"a\":\"\"}]", "[{\"a\":\"5\"}]"]}));
        assert_eq!(
            interpret(env, &single().multiple()).unwrap(),
            ProcedureOutcome::ResultSets(vec![vec![], vec![row(&json!({"a": "5"}))]])
        );
    }

    #[test]
    fn error_message_wins_over_value() {
        let env = envelope(&json!({"returnErrorMsg": "boom", "returnUserMessage": "hi",
                                   "returnValue": ["[{\"a\":\"1\"}]"]}));
        assert!(matches!(
            interpret(env, &single().user_message_as_value()),
            Err(DomainError::RemoteError(m)) if m == "boom"
        ));
    }

    #[test]
    fn user_message_as_error_or_value() {
        let env = envelope(&json!({"returnUserMessage": "hello", "returnValue": "garbage"}));
        assert!(matches!(
            interpret(env.clone(), &single()),
            Err(DomainError::RemoteUserMessage(m)) if m == "hello"
        ));
        assert_eq!(
            interpret(env, &single().user_message_as_value()).unwrap(),
            ProcedureOutcome::Message("hello".to_owned())
        );
    }

    #[test]
    fn error_message_wins_over_malformed_value() {
        for value in [json!("garbage"), json!({"x": 1}), json!(7)] {
            let env = envelope(&json!({"returnErrorMsg": "boom", "returnValue": value}));
            assert!(matches!(
                interpret(env, &single()),
                Err(DomainError::RemoteError(m)) if m == "boom"
            ));
        }
    }

    #[test]
    fn void_procedure_skips_decoding() {
        let env = envelope(&json!({"returnValue": ["not json"]}));
        assert_eq!(interpret(env, &single().void()).unwrap(), ProcedureOutcome::Void);
    }

    #[test]
    fn unreadable_value_is_unparsed() {
        for body in [
            json!({}),
            json!({"returnValue": []}),
            json!({"returnValue": ["not json"]}),
            json!({"returnValue": ["{\"a\":1}"]}),
            json!({"returnValue": ["[1,2]"]}),
            json!({"returnValue": [42]}),
            json!({"returnValue": "garbage"}),
            json!({"returnValue": {"rows": []}}),
        ] {
            let outcome = interpret(envelope(&body), &single()).unwrap();
            assert!(outcome.is_unparsed(), "{body}");
        }
    }

    #[test]
    fn one_bad_set_makes_multi_unparsed() {
        let env = envelope(&json!({"returnValue": ["[]", "oops"]}));
        match interpret(env, &single().multiple()).unwrap() {
            ProcedureOutcome::Unparsed { reason } => assert!(reason.starts_with("returnValue[1]")),
            other => panic!("expected Unparsed, got {other:?}"),
        }
    }
}
