//! Batch engine and status classification tests over scripted in-memory
//! transports. The transport seam lets these tests observe the exact
//! envelopes the engine submits and answer with synthetic responses,
//! including status codes a well-behaved server would never produce.

use async_trait::async_trait;
use msgraph::{
    BatchRequest, GraphClient, GraphError, HttpTransport, Method, RequestOptions,
    TransportRequest, TransportResponse,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Answers every submitted batch member with a 200 sub-response and records
/// each envelope it receives.
#[derive(Default)]
struct EchoTransport {
    requests: Mutex<Vec<TransportRequest>>,
}

impl EchoTransport {
    fn recorded(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn envelopes(&self) -> Vec<Value> {
        self.recorded()
            .iter()
            .map(|r| r.body.clone().expect("batch submissions carry a body"))
            .collect()
    }
}

#[async_trait]
impl HttpTransport for EchoTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, GraphError> {
        let entries = request
            .body
            .as_ref()
            .and_then(|b| b.get("requests"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let responses: Vec<Value> = entries
            .iter()
            .map(|e| json!({ "id": e["id"], "status": 200, "body": { "echoed": true } }))
            .collect();
        self.requests.lock().unwrap().push(request);
        Ok(TransportResponse {
            status: 200,
            body: serde_json::to_vec(&json!({ "responses": responses })).unwrap(),
        })
    }
}

/// Pops a pre-scripted response per send; panics when the script runs dry.
struct ScriptedTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    sends: Mutex<usize>,
}

impl ScriptedTransport {
    fn new(script: Vec<(u16, Value)>) -> Self {
        Self {
            responses: Mutex::new(
                script
                    .into_iter()
                    .map(|(status, body)| TransportResponse {
                        status,
                        body: serde_json::to_vec(&body).unwrap(),
                    })
                    .collect(),
            ),
            sends: Mutex::new(0),
        }
    }

    fn send_count(&self) -> usize {
        *self.sends.lock().unwrap()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, GraphError> {
        *self.sends.lock().unwrap() += 1;
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script ran dry"))
    }
}

fn client_with(transport: Arc<dyn HttpTransport>) -> GraphClient {
    GraphClient::builder().token("T").transport(transport).build()
}

#[tokio::test]
async fn five_members_with_chunk_size_two_make_three_submissions() {
    let transport = Arc::new(EchoTransport::default());
    let graph = client_with(transport.clone());

    let mut batch = graph.batch_builder();
    batch.chunk_size(2);
    for i in 0..5 {
        batch.add(BatchRequest::new(&format!("/items/{i}")).with_id(i.to_string()));
    }
    let results = batch.execute().await.unwrap();

    assert_eq!(results.len(), 5);
    let envelopes = transport.envelopes();
    assert_eq!(envelopes.len(), 3);
    let sizes: Vec<usize> = envelopes
        .iter()
        .map(|e| e["requests"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    // Every submission targets the versioned $batch endpoint.
    for request in transport.recorded() {
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "https://graph.microsoft.com/v1.0/$batch");
    }
}

#[tokio::test]
async fn empty_batch_submits_nothing() {
    let transport = Arc::new(EchoTransport::default());
    let graph = client_with(transport.clone());

    let results = graph.batch(|_| {}).await.unwrap();
    assert!(results.is_empty());
    assert!(transport.recorded().is_empty());
}

#[tokio::test]
async fn dependency_within_a_chunk_is_preserved() {
    let transport = Arc::new(EchoTransport::default());
    let graph = client_with(transport.clone());

    let results = graph
        .batch(|batch| {
            batch.add(BatchRequest::new("/a").with_id("A"));
            batch.add(BatchRequest::new("/b").with_id("B").with_depends_on("A"));
        })
        .await
        .unwrap();
    assert_eq!(results.len(), 2);

    let envelopes = transport.envelopes();
    assert_eq!(envelopes.len(), 1);
    let entries = envelopes[0]["requests"].as_array().unwrap();
    assert!(entries[0].get("dependsOn").is_none());
    assert_eq!(entries[1]["dependsOn"], json!(["A"]));
}

#[tokio::test]
async fn chunk_boundary_strips_cross_chunk_dependencies() {
    let transport = Arc::new(EchoTransport::default());
    let graph = client_with(transport.clone());

    let mut batch = graph.batch_builder();
    batch.chunk_size(1);
    batch.add(BatchRequest::new("/a").with_id("A"));
    batch.add(BatchRequest::new("/b").with_id("B").with_depends_on("A"));
    let results = batch.execute().await.unwrap();
    assert_eq!(results.len(), 2);

    let envelopes = transport.envelopes();
    assert_eq!(envelopes.len(), 2);
    // B became the first (and only) member of its chunk; its dependency on A
    // points outside the chunk and must not be submitted.
    let b_entry = &envelopes[1]["requests"].as_array().unwrap()[0];
    assert_eq!(b_entry["id"], "B");
    assert!(b_entry.get("dependsOn").is_none());
}

#[tokio::test]
async fn first_member_dependency_is_always_cleared() {
    let transport = Arc::new(EchoTransport::default());
    let graph = client_with(transport.clone());

    graph
        .batch(|batch| {
            batch.add(BatchRequest::new("/a").with_id("A").with_depends_on("X"));
        })
        .await
        .unwrap();

    let envelopes = transport.envelopes();
    let first = &envelopes[0]["requests"].as_array().unwrap()[0];
    assert!(first.get("dependsOn").is_none());
}

#[tokio::test]
async fn unknown_sub_response_ids_are_skipped() {
    let transport = Arc::new(ScriptedTransport::new(vec![(
        200,
        json!({
            "responses": [
                { "id": "ghost", "status": 200, "body": null },
                { "id": "A", "status": 200, "body": null },
            ]
        }),
    )]));
    let graph = client_with(transport);

    let results = graph
        .batch(|batch| {
            batch.add(BatchRequest::new("/a").with_id("A"));
        })
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].request.id(), "A");
}

#[tokio::test]
async fn colliding_ids_resolve_to_the_last_member() {
    let transport = Arc::new(EchoTransport::default());
    let graph = client_with(transport.clone());

    let results = graph
        .batch(|batch| {
            batch.add(BatchRequest::new("/first").with_id("dup"));
            batch.add(BatchRequest::new("/second").with_id("dup"));
        })
        .await
        .unwrap();

    // Both sub-responses correlate to the last member carrying the id.
    assert_eq!(results.len(), 2);
    for result in &results {
        assert_eq!(result.request.url(), "/second");
    }
}

#[tokio::test]
async fn a_failing_chunk_aborts_and_skips_later_chunks() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        (
            200,
            json!({ "responses": [{ "id": "A", "status": 200, "body": null }] }),
        ),
        (500, json!({ "error": { "code": "internalServerError" } })),
        // A third chunk would be next, but the engine must stop first.
        (200, json!({ "responses": [] })),
    ]));
    let graph = client_with(transport.clone());

    let mut batch = graph.batch_builder();
    batch.chunk_size(1);
    batch.add(BatchRequest::new("/a").with_id("A"));
    batch.add(BatchRequest::new("/b").with_id("B"));
    batch.add(BatchRequest::new("/c").with_id("C"));
    let err = batch.execute().await.unwrap_err();

    match err {
        GraphError::Api(e) => assert_eq!(e.status, 500),
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(transport.send_count(), 2);
}

#[tokio::test]
async fn status_999_is_an_unexpected_status_not_an_api_error() {
    let transport = Arc::new(ScriptedTransport::new(vec![(999, json!({}))]));
    let graph = client_with(transport);

    let err = graph.get("/me", RequestOptions::new()).await.unwrap_err();
    match err {
        GraphError::UnexpectedStatus(status) => assert_eq!(status, 999),
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn status_404_is_classified_as_an_api_error() {
    let transport = Arc::new(ScriptedTransport::new(vec![(
        404,
        json!({ "error": { "code": "itemNotFound" } }),
    )]));
    let graph = client_with(transport);

    let err = graph.get("/me", RequestOptions::new()).await.unwrap_err();
    match err {
        GraphError::Api(e) => {
            assert_eq!(e.status, 404);
            assert!(e.response.is_some());
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_without_a_responses_array_is_a_parse_error() {
    let transport = Arc::new(ScriptedTransport::new(vec![(200, json!({ "odd": 1 }))]));
    let graph = client_with(transport);

    let err = graph
        .batch(|batch| {
            batch.add(BatchRequest::new("/a"));
        })
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Parse(_)));
}
