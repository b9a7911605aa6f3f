//! End-to-end invocation through `ProcessClient` with a scripted transport.

use async_trait::async_trait;
use idempiere_ws_client::transport::SOAP_CONTENT_TYPE;
use idempiere_ws_client::{
    FailureKind, HttpRequest, HttpResponse, InvocationEvent, Parameter, ProcessClient, Transport,
    TransportFailure, UserContext, WsError, XmlElement,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

const SERVER: &str = "http://erp.test:8080/";
const ENDPOINT: &str = "http://erp.test:8080/ADInterface/services/ModelADService";

struct ScriptedTransport {
    reply: Result<HttpResponse, TransportFailure>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn replying(status: u16, message: &str, body: &str) -> Self {
        Self {
            reply: Ok(HttpResponse::new(status, message, body)),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(TransportFailure::new(message)),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        self.reply.clone()
    }
}

type Events = Arc<Mutex<Vec<InvocationEvent>>>;

fn client(transport: ScriptedTransport) -> (ProcessClient<ScriptedTransport>, Events) {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let client = ProcessClient::with_transport(SERVER, transport).with_observer(Arc::new(
        move |event: &InvocationEvent| sink.lock().unwrap().push(event.clone()),
    ));
    (client, events)
}

fn ctx() -> UserContext {
    UserContext::new("SuperUser", "System", 11, 11)
        .unwrap()
        .with_role(102)
}

fn run_process_body(is_error: bool, text: &str) -> String {
    let inner = if is_error {
        format!("<Error>{}</Error>", text)
    } else {
        format!("<Summary>{}</Summary>", text)
    };
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body>"#,
            r#"<ns1:runProcessResponse xmlns:ns1="http://idempiere.org/ADInterface/1_0">"#,
            r#"<RunProcessResponse IsError="{}">{}</RunProcessResponse>"#,
            r#"</ns1:runProcessResponse></soap:Body></soap:Envelope>"#
        ),
        is_error, inner
    )
}

#[tokio::test]
async fn sends_one_soap_post_to_the_service_endpoint() {
    let (client, _) = client(ScriptedTransport::replying(
        200,
        "OK",
        &run_process_body(false, "Process completed"),
    ));
    let params = vec![
        Parameter::new("C_Order_ID", 1000123),
        Parameter::new("DocAction", "CO"),
        Parameter::new("Note", None::<String>),
    ];

    let result = client.invoke_process("CompleteOrder", &ctx(), &params).await;
    assert_eq!(result, Ok("Process completed".to_string()));

    let requests = client.transport().requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(request.url, ENDPOINT);
    assert_eq!(request.header("Content-Type"), Some(SOAP_CONTENT_TYPE));

    let doc = XmlElement::parse(&request.body).unwrap();
    let values = doc
        .select(&[
            "Envelope",
            "Body",
            "runProcess",
            "ModelRunProcessRequest",
            "ModelRunProcess",
            "ParamValues",
        ])
        .unwrap();
    let columns: Vec<&str> = values
        .children_named("field")
        .filter_map(|f| f.attribute("column"))
        .collect();
    assert_eq!(columns, vec!["C_Order_ID", "DocAction", "Note"]);
}

#[tokio::test]
async fn missing_username_never_reaches_the_transport() {
    let (client, events) = client(ScriptedTransport::replying(
        200,
        "OK",
        &run_process_body(false, "unused"),
    ));

    let result = client
        .invoke_process_value(
            "CompleteOrder",
            &json!({"password": "System", "ad_client_id": 11, "ad_org_id": 0}),
            &json!([{"column": "C_Order_ID", "val": 1}]),
        )
        .await;

    assert!(matches!(result, Err(WsError::MissingCredential(_))));
    assert!(client.transport().requests().is_empty());

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], InvocationEvent::Rejected { error, .. }
        if error.kind() == FailureKind::MissingCredential));
}

#[tokio::test]
async fn invalid_parameter_list_never_reaches_the_transport() {
    let (client, _) = client(ScriptedTransport::replying(200, "OK", ""));

    let result = client
        .invoke_process_value(
            "CompleteOrder",
            &json!({"username": "u", "password": "p", "ad_client_id": 11, "ad_org_id": 0}),
            &json!({"C_Order_ID": 1}),
        )
        .await;

    assert!(matches!(result, Err(WsError::InvalidParameterList(_))));
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn long_value_warns_without_changing_the_outcome() {
    let body = run_process_body(false, "Imported");
    let (short_client, _) = client(ScriptedTransport::replying(200, "OK", &body));
    let (long_client, events) = client(ScriptedTransport::replying(200, "OK", &body));

    let short = short_client
        .invoke_process("Import", &ctx(), &[Parameter::new("Description", "short")])
        .await;
    let long = long_client
        .invoke_process("Import", &ctx(), &[Parameter::new("Description", "x".repeat(300))])
        .await;

    assert_eq!(short, long);
    assert_eq!(long, Ok("Imported".to_string()));

    let events = events.lock().unwrap();
    let advisories: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            InvocationEvent::TruncationAdvisory { advisory, .. } => Some(advisory.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(advisories.len(), 1);
    assert_eq!(advisories[0].column, "Description");
    assert_eq!(advisories[0].length, 300);
    assert!(matches!(events.last(), Some(InvocationEvent::Completed { result: Ok(_), .. })));
}

#[tokio::test]
async fn classifies_each_failure_layer() {
    let fault = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Server</faultcode><faultstring>Server overloaded</faultstring></soap:Fault></soap:Body></soap:Envelope>"#;

    let cases = vec![
        (
            ScriptedTransport::failing("connection refused"),
            WsError::Transport("connection refused".into()),
        ),
        (
            ScriptedTransport::replying(404, "Not Found", fault),
            WsError::EndpointNotFound {
                status: 404,
                message: "Not Found".into(),
            },
        ),
        (
            ScriptedTransport::replying(500, "Internal Server Error", fault),
            WsError::ProtocolFault("Server overloaded".into()),
        ),
        (
            ScriptedTransport::replying(200, "OK", &run_process_body(true, "Insufficient permissions")),
            WsError::Business("Insufficient permissions".into()),
        ),
        (
            ScriptedTransport::replying(200, "OK", "<<<"),
            WsError::MalformedResponse("<<<".into()),
        ),
        (
            ScriptedTransport::replying(503, "Service Unavailable", "busy"),
            WsError::MalformedFault("busy".into()),
        ),
    ];

    for (transport, expected) in cases {
        let (client, events) = client(transport);
        let result = client.invoke_process("P", &ctx(), &[]).await;
        assert_eq!(result, Err(expected.clone()));

        let events = events.lock().unwrap();
        match events.last() {
            Some(InvocationEvent::Completed { result, endpoint, .. }) => {
                assert_eq!(result, &Err(expected));
                assert_eq!(endpoint, ENDPOINT);
            }
            other => panic!("expected a completion event, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn concurrent_calls_do_not_interfere() {
    let (client, _) = client(ScriptedTransport::replying(
        200,
        "OK",
        &run_process_body(false, "ok"),
    ));

    let ctx = ctx();
    let first = [Parameter::new("A", 1)];
    let second = [Parameter::new("B", 2)];
    let (a, b) = tokio::join!(
        client.invoke_process("First", &ctx, &first),
        client.invoke_process("Second", &ctx, &second),
    );
    assert_eq!(a, Ok("ok".to_string()));
    assert_eq!(b, Ok("ok".to_string()));

    let requests = client.transport().requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().any(|r| r.body.contains("<_0:serviceType>First</_0:serviceType>")
        && r.body.contains(r#"column="A""#)
        && !r.body.contains(r#"column="B""#)));
}
