//! Linode client tests against a mock API.

use linode_dashboard::providers::linode::Linode;
use linode_dashboard::providers::{AccountApi, ProviderError};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Linode {
    Linode::with_base_url("test-token", server.uri()).unwrap()
}

#[tokio::test]
async fn test_get_account_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balance": 0.0,
            "balance_uninvoiced": 41.37,
            "email": "ops@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let account = client(&server).get_account().await.unwrap();
    assert!((account.balance_uninvoiced - 41.37).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_list_instances_follows_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/linode/instances"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 1,
                "label": "web-1",
                "status": "running",
                "region": "us-east",
                "type": "g6-standard-1",
                "ipv4": ["203.0.113.1"]
            }],
            "page": 1,
            "pages": 2,
            "results": 2
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/linode/instances"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 2,
                "label": "db-1",
                "status": "offline",
                "region": "eu-west",
                "type": null,
                "ipv4": []
            }],
            "page": 2,
            "pages": 2,
            "results": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let instances = client(&server).list_instances().await.unwrap();
    let ids: Vec<u64> = instances.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(instances[0].instance_type, "g6-standard-1");
    assert_eq!(instances[1].instance_type, "");
}

#[tokio::test]
async fn test_instance_ips_flatten_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/linode/instances/7/ips"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ipv4": {
                "public": [{"address": "203.0.113.7", "rdns": "li7.members.linode.com"}],
                "private": [{"address": "192.168.133.7"}],
                "shared": [],
                "reserved": []
            },
            "ipv6": {
                "slaac": {"address": "2600:3c00::f03c:91ff:fe24:3a2f"},
                "link_local": {"address": "fe80::f03c:91ff:fe24:3a2f"},
                "global": [{"range": "2600:3c01:e000:3cf::", "prefix": 64, "region": "us-east"}]
            }
        })))
        .mount(&server)
        .await;

    let ips = client(&server).get_instance_ips(7).await.unwrap();
    assert_eq!(
        ips.flatten(),
        vec!["203.0.113.7", "192.168.133.7", "2600:3c01:e000:3cf::"]
    );
}

#[tokio::test]
async fn test_list_invoices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 20, "date": "2026-10-01T00:00:00", "label": "Invoice", "subtotal": 90.0, "tax": 10.0, "total": 100.0},
                {"id": 19, "date": "2026-09-01T00:00:00", "label": "Invoice", "subtotal": 45.0, "tax": 5.0, "total": 50.0}
            ],
            "page": 1,
            "pages": 1,
            "results": 2
        })))
        .mount(&server)
        .await;

    let invoices = client(&server).list_invoices().await.unwrap();
    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[0].id, 20);
    assert!((invoices[0].total - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_error_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{"reason": "Invalid Token"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/linode/instances/9/ips"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"reason": "Not found"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/account/invoices"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = client(&server);

    match client.get_account().await {
        Err(ProviderError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid Token");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        client.get_instance_ips(9).await,
        Err(ProviderError::NotFound(_))
    ));
    assert!(matches!(
        client.list_invoices().await,
        Err(ProviderError::RateLimited(_))
    ));
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        client(&server).get_account().await,
        Err(ProviderError::Serialization(_))
    ));
}
