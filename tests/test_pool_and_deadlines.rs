//! Pool bound and deadline behaviour through the full application.

mod common;

use actix_web::test;
use common::{TestStore, HR_FIXTURE};
use serde_json::Value;

#[actix_web::test]
async fn test_requests_beyond_pool_bound_queue_and_succeed() {
    let store = TestStore::new(HR_FIXTURE);
    let mut config = store.config();
    config.database.max_connections = 2;
    let components = store.components_with(config).await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let gateway = components.gateway.clone();
        handles.push(tokio::spawn(async move {
            gateway.list_rows("employees", &gateway.context()).await
        }));
    }
    for handle in handles {
        let result = handle.await.expect("task panicked").expect("query failed");
        assert_eq!(result.row_count(), 2);
    }

    let status = components.pool.status();
    assert!(status.open <= 2, "opened {} connections", status.open);
    assert_eq!(status.in_use, 0);
}

#[actix_web::test]
async fn test_query_deadline_returns_503() {
    let store = TestStore::new(
        "CREATE TABLE big (n INTEGER, label TEXT);
         WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 200000)
         INSERT INTO big SELECT x, 'row ' || x FROM c;",
    );
    let mut config = store.config();
    config.database.query_timeout_ms = 1;
    let components = store.components_with(config).await;
    let app = test_app!(components);

    let req = test::TestRequest::get().uri("/list-table/big").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "QUERY_CANCELLED");

    // The connection went back to the pool and still works.
    assert_eq!(components.pool.status().in_use, 0);
    components
        .pool
        .ping(&hrms_store::QueryContext::new())
        .await
        .expect("pool usable after cancellation");
}

#[actix_web::test]
async fn test_health_probes() {
    let store = TestStore::new(HR_FIXTURE);
    let components = store.components().await;
    let app = test_app!(components);

    for uri in ["/healthz", "/readyz"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200, "uri {}", uri);
    }
}
