//! Ingestion flow over a mocked provider API: the client, normalization,
//! and runner working together against real HTTP.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lookout_core::{
    IngestRunner, LinodeClient, LookoutError, MetricName, RecordingSink, Service, ServiceType,
    LINODE_SENTINEL,
};

fn fleet_service() -> Service {
    Service::new("linode-fleet".to_string(), ServiceType::LinodeServer)
        .with_api_key_identifier(LINODE_SENTINEL)
}

fn instances_body() -> serde_json::Value {
    json!({
        "data": [
            {"id": 101, "label": "prod-1", "specs": {"memory": 8192, "disk": 163840, "vcpus": 4}},
            {"id": 202, "label": "prod-2", "specs": {"memory": 4096, "disk": 81920, "vcpus": 2}}
        ],
        "page": 1,
        "pages": 1,
        "results": 2
    })
}

fn stats_body(cpu: f64, io: f64) -> serde_json::Value {
    json!({
        "data": [
            {"cpu": 5.0, "io": {"io": 10.0, "swap": 0.0},
             "netv4": {"in": 1.0, "out": 1.0}, "netv6": {"in": 0.0, "out": 0.0}},
            {"cpu": cpu, "io": {"io": io, "swap": 0.0},
             "netv4": {"in": 100.0, "out": 200.0}, "netv6": {"in": 10.0, "out": 20.0}}
        ]
    })
}

fn client_for(server: &MockServer) -> LinodeClient {
    LinodeClient::new("test-token".to_string()).with_base_url(server.uri())
}

#[tokio::test]
async fn ingest_writes_four_rows_per_instance() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linode/instances"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(instances_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/linode/instances/101/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(65.0, 1024.0)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/linode/instances/202/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(45.0, 512.0)))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::new());
    let runner = IngestRunner::new(Arc::new(client_for(&server)), sink.clone());

    let report = runner.run(&fleet_service()).await.unwrap();

    assert_eq!(report.instances_seen, 2);
    assert_eq!(report.instances_failed, 0);
    assert_eq!(report.metrics_written, 8);

    let written = sink.written().await;
    assert_eq!(written.len(), 8);

    // Each instance contributes one row per metric name, tagged with its
    // own identity, derived from the LAST sample of its series.
    for (id, label, cpu) in [(101, "prod-1", 65.0), (202, "prod-2", 45.0)] {
        let rows: Vec<_> = written
            .iter()
            .filter(|m| m.labels.as_ref().unwrap()["instance_id"] == id)
            .collect();
        assert_eq!(rows.len(), 4);

        for row in &rows {
            assert_eq!(row.labels.as_ref().unwrap()["instance_label"], label);
        }

        let cpu_row = rows
            .iter()
            .find(|m| m.metric_name == MetricName::Cpu)
            .unwrap();
        assert_eq!(cpu_row.value, cpu);

        let network_row = rows
            .iter()
            .find(|m| m.metric_name == MetricName::Network)
            .unwrap();
        assert_eq!(network_row.value, 330.0);
    }
}

#[tokio::test]
async fn failing_instance_is_skipped_and_the_rest_land() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linode/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(instances_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/linode/instances/101/stats"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/linode/instances/202/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(45.0, 512.0)))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::new());
    let runner = IngestRunner::new(Arc::new(client_for(&server)), sink.clone());

    let report = runner.run(&fleet_service()).await.unwrap();

    assert_eq!(report.instances_seen, 2);
    assert_eq!(report.instances_failed, 1);
    assert_eq!(report.metrics_written, 4);
    assert_eq!(report.errors[0].instance_id, 101);

    let written = sink.written().await;
    assert_eq!(written.len(), 4);
    for row in &written {
        assert_eq!(row.labels.as_ref().unwrap()["instance_id"], 202);
    }
}

#[tokio::test]
async fn list_failure_aborts_the_run_with_nothing_written() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linode/instances"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::new());
    let runner = IngestRunner::new(Arc::new(client_for(&server)), sink.clone());

    let err = runner.run(&fleet_service()).await.unwrap_err();

    assert!(matches!(err, LookoutError::ProviderRequestFailed(_)));
    assert!(err.to_string().contains("500"));
    assert!(sink.is_empty().await);
}

#[tokio::test]
async fn malformed_stats_payload_skips_the_instance() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linode/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(instances_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/linode/instances/101/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    // Empty series: well-formed but unusable.
    Mock::given(method("GET"))
        .and(path("/linode/instances/202/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::new());
    let runner = IngestRunner::new(Arc::new(client_for(&server)), sink.clone());

    let report = runner.run(&fleet_service()).await.unwrap();

    assert_eq!(report.instances_failed, 2);
    assert_eq!(report.metrics_written, 0);
    assert!(sink.is_empty().await);
}
