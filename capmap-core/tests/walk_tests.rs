// Tests for walk orchestration against a mock Pathfinder endpoint

use capmap_client::{Application, CapabilityClient, ClientError, CollisionPolicy};
use capmap_core::{WalkOptions, execute_tree, execute_walk};
use serde_json::{Value, json};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method},
};

async fn mount_node(server: &MockServer, id: &str, name: &str, children: &[&str], apps: Value) {
    let children: Vec<Value> = children
        .iter()
        .map(|c| json!({"id": c, "name": c}))
        .collect();
    let edges: Vec<Value> = apps
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|a| json!({"node": a}))
        .collect();

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"variables": {"bcId": id}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "businessCapability": {
                    "id": id,
                    "name": name,
                    "children": children,
                    "applications": {"edges": edges}
                }
            }
        })))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> CapabilityClient {
    CapabilityClient::new("acme", "token")
        .unwrap()
        .with_endpoint(Url::parse(&server.uri()).unwrap())
}

#[tokio::test]
async fn test_execute_walk_builds_map() {
    let server = MockServer::start().await;
    mount_node(
        &server,
        "A",
        "A",
        &["B", "C"],
        json!([{"id": "1", "name": "App1", "lifecyclePhase": "active"}]),
    )
    .await;
    mount_node(&server, "B", "B", &[], json!([])).await;
    mount_node(
        &server,
        "C",
        "C",
        &[],
        json!([{"id": "2", "name": "App2", "lifecyclePhase": "retired"}]),
    )
    .await;

    let outcome = execute_walk(client_for(&server), WalkOptions::new("A"))
        .await
        .unwrap();

    assert_eq!(outcome.root_id, "A");
    assert_eq!(outcome.nodes_fetched, 3);
    assert_eq!(outcome.applications.len(), 3);
    assert_eq!(
        outcome.applications["A"],
        vec![Application::new("1", "App1", Some("active"))]
    );
    assert!(outcome.applications["B"].is_empty());
    assert_eq!(
        outcome.applications["C"],
        vec![Application::new("2", "App2", Some("retired"))]
    );
}

#[tokio::test]
async fn test_execute_walk_with_progress_enabled() {
    let server = MockServer::start().await;
    mount_node(&server, "A", "Root", &[], json!([])).await;

    let mut options = WalkOptions::new("A");
    options.show_progress = true;

    let outcome = execute_walk(client_for(&server), options).await.unwrap();
    assert_eq!(outcome.nodes_fetched, 1);
}

#[tokio::test]
async fn test_execute_walk_strict_names() {
    let server = MockServer::start().await;
    mount_node(&server, "R", "Root", &["X", "Y"], json!([])).await;
    mount_node(&server, "X", "Twin", &[], json!([])).await;
    mount_node(&server, "Y", "Twin", &[], json!([])).await;

    let mut options = WalkOptions::new("R");
    options.collision = CollisionPolicy::Fail;

    let result = execute_walk(client_for(&server), options).await;
    assert!(matches!(result, Err(ClientError::NameCollision { .. })));
}

#[tokio::test]
async fn test_execute_walk_overwrites_shared_names() {
    let server = MockServer::start().await;
    mount_node(&server, "R", "Root", &["X", "Y"], json!([])).await;
    mount_node(&server, "X", "Twin", &[], json!([{"id": "x", "name": "FromX"}])).await;
    mount_node(&server, "Y", "Twin", &[], json!([{"id": "y", "name": "FromY"}])).await;

    let outcome = execute_walk(client_for(&server), WalkOptions::new("R"))
        .await
        .unwrap();

    assert_eq!(outcome.nodes_fetched, 3);
    assert_eq!(outcome.applications.len(), 2);
    // Y is popped first, X last
    assert_eq!(outcome.applications["Twin"][0].name, "FromX");
}

#[tokio::test]
async fn test_execute_walk_fails_whole_on_error() {
    let server = MockServer::start().await;
    mount_node(&server, "R", "Root", &["bad"], json!([])).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"variables": {"bcId": "bad"}})))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = execute_walk(client_for(&server), WalkOptions::new("R")).await;
    assert!(result.unwrap_err().is_transport());
}

#[tokio::test]
async fn test_execute_tree_returns_visit_order() {
    let server = MockServer::start().await;
    mount_node(&server, "A", "Root", &["B", "C"], json!([])).await;
    mount_node(&server, "B", "Left", &[], json!([])).await;
    mount_node(&server, "C", "Right", &[], json!([])).await;

    let nodes = execute_tree(client_for(&server), "A", false).await.unwrap();
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "C", "B"]);
}
