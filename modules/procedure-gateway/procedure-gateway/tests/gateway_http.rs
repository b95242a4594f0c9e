#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use httpmock::prelude::*;
use procedure_gateway::config::{EndpointsConfig, HttpConfig};
use procedure_gateway::{
    CallerIdentity, ProcedureCall, ProcedureGatewayClient, ProcedureGatewayConfig,
    ProcedureGatewayError, ProcedureOutcome, build_client,
};
use serde_json::{Value, json};

const GENERAL: &str = "/API/ServiceExecute/pda/general";
const OUTPUT: &str = "/API/ServiceExecute/pda/output";
const GETDATE: &str = "/API/ServiceExecute/pda/dt";
const DICTIONARY: &str = "/API/ServiceExecute/pda/dictionary";

fn config_for(server: &MockServer) -> ProcedureGatewayConfig {
    ProcedureGatewayConfig {
        endpoints: EndpointsConfig {
            general: Some(server.url(GENERAL)),
            output: Some(server.url(OUTPUT)),
            output_front: None,
            getdate: Some(server.url(GETDATE)),
            dictionary: Some(server.url(DICTIONARY)),
        },
        http: HttpConfig {
            allow_insecure_http: true,
            ..HttpConfig::default()
        },
        client_network_type: Some("wifi".to_owned()),
        ..ProcedureGatewayConfig::default()
    }
}

fn client_for(server: &MockServer) -> Arc<dyn ProcedureGatewayClient> {
    build_client(&config_for(server)).unwrap()
}

fn identity() -> CallerIdentity {
    CallerIdentity::new("U1001", "P100")
}

fn envelope(error: Option<&str>, user_message: Option<&str>, value: &[&str]) -> Value {
    json!({
        "returnErrorMsg": error,
        "returnUserMessage": user_message,
        "returnValue": value,
    })
}

fn row(value: &Value) -> procedure_gateway::Row {
    value.as_object().unwrap().clone()
}

#[tokio::test]
async fn call_sends_one_post_with_delimited_params() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path(GENERAL)
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .json_body(json!({
                "userID": "U1001",
                "userPlant": "P100",
                "serviceID": "USP_STOCK",
                "serviceParam": "'A'&del;'B'",
                "serviceCallerEventType": "Scan",
                "serviceCallerEventName": "btnSearch",
                "clientNetworkType": "wifi"
            }));
        then.status(200)
            .json_body(envelope(None, None, &[r#"[{"ITEM":"A-100","QTY":"4"}]"#]));
    });

    let outcome = client_for(&server)
        .invoke(
            &identity(),
            ProcedureCall::new("USP_STOCK")
                .params(["A", "B"])
                .event("Scan", "btnSearch"),
        )
        .await
        .unwrap();

    m.assert_calls(1);
    assert_eq!(
        outcome,
        ProcedureOutcome::Rows(vec![row(&json!({"ITEM": "A-100", "QTY": "4"}))])
    );
}

#[tokio::test]
async fn numeric_param_is_sent_as_number() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path(GENERAL).json_body(json!({
            "userID": null,
            "userPlant": null,
            "serviceID": "USP_LOT",
            "serviceParam": 42,
            "serviceCallerEventType": "",
            "serviceCallerEventName": "",
            "clientNetworkType": "wifi"
        }));
        then.status(200).json_body(envelope(None, None, &["[]"]));
    });

    let outcome = client_for(&server)
        .invoke(
            &CallerIdentity::anonymous(),
            ProcedureCall::new("USP_LOT").number_param(42),
        )
        .await
        .unwrap();

    m.assert();
    assert_eq!(outcome, ProcedureOutcome::Rows(vec![]));
}

#[tokio::test]
async fn sentinel_row_decodes_to_empty_result() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200)
            .json_body(envelope(None, None, &[r#"[{"col":""}]"#]));
    });

    let outcome = client_for(&server)
        .invoke(&identity(), ProcedureCall::new("USP_EMPTY").no_params())
        .await
        .unwrap();
    assert_eq!(outcome, ProcedureOutcome::Rows(vec![]));
}

#[tokio::test]
async fn multiple_result_sets_decode_independently() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200).json_body(envelope(
            None,
            None,
            &[r#"[{"a":""}]"#, r#"[{"a":"5"},{"a":"6"}]"#],
        ));
    });

    let outcome = client_for(&server)
        .invoke(&identity(), ProcedureCall::new("USP_MULTI").no_params().multiple())
        .await
        .unwrap();

    let sets = outcome.result_sets().unwrap();
    assert_eq!(sets.len(), 2);
    assert!(sets[0].is_empty());
    assert_eq!(sets[1].len(), 2);
}

#[tokio::test]
async fn return_error_msg_fails_the_call() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200)
            .json_body(envelope(Some("boom"), None, &[r#"[{"a":"1"}]"#]));
    });

    let err = client_for(&server)
        .invoke(&identity(), ProcedureCall::new("USP_FAIL").no_params())
        .await
        .unwrap_err();
    assert_eq!(err, ProcedureGatewayError::remote("boom"));
    assert_eq!(err.to_string(), "boom");
}

#[tokio::test]
async fn return_error_msg_wins_over_malformed_return_value() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200)
            .json_body(json!({"returnErrorMsg": "boom", "returnValue": "x"}));
    });

    let err = client_for(&server)
        .invoke(&identity(), ProcedureCall::new("USP_FAIL").no_params())
        .await
        .unwrap_err();
    assert_eq!(err, ProcedureGatewayError::remote("boom"));
}

#[tokio::test]
async fn user_message_value_ignores_malformed_return_value() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200)
            .json_body(json!({"returnUserMessage": "hello", "returnValue": {"x": 1}}));
    });

    let outcome = client_for(&server)
        .invoke(
            &identity(),
            ProcedureCall::new("USP_SAVE").no_params().user_message_as_value(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, ProcedureOutcome::Message("hello".to_owned()));
}

#[tokio::test]
async fn non_array_return_value_is_unparsed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200).json_body(json!({"returnValue": "garbage"}));
    });

    let outcome = client_for(&server)
        .invoke(&identity(), ProcedureCall::new("USP_LIST").no_params())
        .await
        .unwrap();
    assert!(outcome.is_unparsed());
}

#[tokio::test]
async fn user_message_is_error_or_value() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200)
            .json_body(envelope(None, Some("saved 3 rows"), &[]));
    });
    let client = client_for(&server);

    let err = client
        .invoke(&identity(), ProcedureCall::new("USP_SAVE").no_params())
        .await
        .unwrap_err();
    assert_eq!(err, ProcedureGatewayError::remote("saved 3 rows"));

    let outcome = client
        .invoke(
            &identity(),
            ProcedureCall::new("USP_SAVE").no_params().user_message_as_value(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, ProcedureOutcome::Message("saved 3 rows".to_owned()));
}

#[tokio::test]
async fn void_procedure_ignores_return_value() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200).json_body(json!({"returnValue": null}));
    });

    let outcome = client_for(&server)
        .invoke(&identity(), ProcedureCall::new("USP_PRINT").text_param("L1").void())
        .await
        .unwrap();
    assert_eq!(outcome, ProcedureOutcome::Void);
}

#[tokio::test]
async fn endpoint_selector_is_case_insensitive() {
    let server = MockServer::start();
    let output = server.mock(|when, then| {
        when.method(POST).path(OUTPUT);
        then.status(200).json_body(envelope(None, None, &["[]"]));
    });
    let general = server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200).json_body(envelope(None, None, &["[]"]));
    });

    client_for(&server)
        .invoke(
            &identity(),
            ProcedureCall::new("USP_LABEL").no_params().endpoint("output"),
        )
        .await
        .unwrap();

    output.assert_calls(1);
    general.assert_calls(0);
}

#[tokio::test]
async fn validation_failures_send_nothing() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(envelope(None, None, &["[]"]));
    });
    let client = client_for(&server);

    let cases = [
        (ProcedureCall::new("").no_params(), "procedure is empty"),
        (ProcedureCall::new("USP_X"), "parameters are undefined"),
        (
            ProcedureCall::new("USP_X").params([json!(true)]),
            "unsupported parameter list element",
        ),
        (
            ProcedureCall::new("USP_X").no_params().endpoint("API"),
            "endpoint unknown",
        ),
        (
            ProcedureCall::new("USP_X").no_params().endpoint(" "),
            "endpoint missing",
        ),
    ];

    for (call, expected) in cases {
        let err = client.invoke(&identity(), call).await.unwrap_err();
        assert!(
            matches!(err, ProcedureGatewayError::InvalidArgument(ref m) if m.contains(expected)),
            "{err}"
        );
    }

    m.assert_calls(0);
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(500).body("database offline");
    });

    let err = client_for(&server)
        .invoke(&identity(), ProcedureCall::new("USP_X").no_params())
        .await
        .unwrap_err();
    assert!(matches!(err, ProcedureGatewayError::Transport { .. }));
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn non_json_body_is_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200).body("<html>gateway</html>");
    });

    let err = client_for(&server)
        .invoke(&identity(), ProcedureCall::new("USP_X").no_params())
        .await
        .unwrap_err();
    assert!(matches!(err, ProcedureGatewayError::Transport { status: None, .. }));
}

#[tokio::test]
async fn undecodable_return_value_is_unparsed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200).json_body(envelope(None, None, &["not json"]));
    });

    let outcome = client_for(&server)
        .invoke(&identity(), ProcedureCall::new("USP_X").no_params())
        .await
        .unwrap();
    assert!(outcome.is_unparsed());
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path(GENERAL);
        then.status(200)
            .json_body(envelope(None, None, &[r#"[{"n":"1"}]"#]));
    });
    let client = client_for(&server);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client
                    .invoke(
                        &identity(),
                        ProcedureCall::new("USP_X").text_param(format!("{i}")),
                    )
                    .await
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.rows().map(<[_]>::len), Some(1));
    }
    m.assert_calls(8);
}

#[tokio::test]
async fn server_time_raw_and_formatted() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path(GETDATE).json_body(json!({}));
        then.status(200)
            .json_body(json!([{"value": "2025-02-28 10:01:20"}]));
    });
    let client = client_for(&server);

    assert_eq!(client.server_time(None).await.unwrap(), "2025-02-28 10:01:20");
    assert_eq!(
        client.server_time(Some("yyyy-mm-dd")).await.unwrap(),
        "2025-02-28"
    );
    assert_eq!(client.server_time(Some("HH:DD")).await.unwrap(), "10:01");
    assert_eq!(
        client.server_time(Some("week")).await.unwrap(),
        "Invalid format"
    );
    m.assert_calls(4);
}

#[tokio::test]
async fn server_time_with_unparseable_value() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GETDATE);
        then.status(200).json_body(json!([{"value": "not a date"}]));
    });

    let formatted = client_for(&server)
        .server_time(Some("YYYY"))
        .await
        .unwrap();
    assert_eq!(formatted, "Invalid Date");
}

#[tokio::test]
async fn server_time_with_empty_response_is_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GETDATE);
        then.status(200).json_body(json!([]));
    });

    let err = client_for(&server).server_time(None).await.unwrap_err();
    assert!(matches!(err, ProcedureGatewayError::Transport { status: None, .. }));
}

#[tokio::test]
async fn translations_build_trimmed_dictionary() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path(DICTIONARY).json_body(json!({
            "userPlant": "P100",
            "serviceID": "USP_PDA_DICTIONARY",
            "serviceParam": "E",
            "serviceCallerEventType": "Translation",
            "serviceCallerEventName": "Translation",
            "clientNetworkType": "wifi"
        }));
        then.status(200).json_body(envelope(
            None,
            None,
            &[r#"[{"SAVE":" Save "},{" LOAD ":"Load"},{"BLANK":"  "}]"#],
        ));
    });

    let dictionary = client_for(&server)
        .translations(&identity(), "E")
        .await
        .unwrap()
        .unwrap();

    m.assert();
    assert_eq!(dictionary.len(), 2);
    assert_eq!(dictionary.get("SAVE").map(String::as_str), Some("Save"));
    assert_eq!(dictionary.get("LOAD").map(String::as_str), Some("Load"));
}

#[tokio::test]
async fn translations_use_the_first_column_as_sent() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(DICTIONARY);
        then.status(200).json_body(envelope(
            None,
            None,
            &[r#"[{"WORD":"Save","TRANSLATED":"Speichern"}]"#],
        ));
    });

    let dictionary = client_for(&server)
        .translations(&identity(), "D")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(dictionary.len(), 1);
    assert_eq!(dictionary.get("WORD").map(String::as_str), Some("Save"));
}

#[tokio::test]
async fn translations_without_return_value_is_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(DICTIONARY);
        then.status(200).json_body(json!({"returnValue": null}));
    });

    let dictionary = client_for(&server)
        .translations(&identity(), "V")
        .await
        .unwrap();
    assert!(dictionary.is_none());
}

#[tokio::test]
async fn translations_for_native_language_skip_the_server() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST).path(DICTIONARY);
        then.status(200).json_body(envelope(None, None, &["[]"]));
    });

    let mut config = config_for(&server);
    config.dictionary.native_language = Some("K".to_owned());
    let client = build_client(&config).unwrap();

    assert!(client.translations(&identity(), "K").await.unwrap().is_none());
    m.assert_calls(0);
}
