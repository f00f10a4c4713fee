//! Webhook regression tests.
//!
//! Drives the assembled router the way the daemon wires it: a redb
//! parameter store on disk, an in-memory fleet, and signed notification
//! bodies. Signatures are computed here with hmac/sha2 directly so the
//! tests stand in for the real notifier.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use sha2::Sha512;
use tower::ServiceExt;

use gantry_api::{ApiState, build_router};
use gantry_core::Settings;
use gantry_fleet::MemoryFleet;
use gantry_scale::Reconciler;
use gantry_state::{DemandCounter, ParamStore, RedbParamStore};

const SECRET: &str = "regression-notification-token";
const TOKEN_PARAM: &str = "/gantry/notification-token";
const COUNTER_PARAM: &str = "/gantry/demand";
const SIGNATURE_HEADER: &str = "x-notification-signature";

struct Harness {
    store: Arc<RedbParamStore>,
    fleet: MemoryFleet,
    router: Router,
    _dir: tempfile::TempDir,
}

async fn harness(max_agents: u32) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(RedbParamStore::open(&dir.path().join("gantry.redb")).unwrap());
    store.put(TOKEN_PARAM, SECRET).await.unwrap();

    let fleet = MemoryFleet::new();
    fleet.insert_service("agents", "ci-agent", 0).await;

    let settings = Settings {
        cluster: "agents".to_string(),
        service: "ci-agent".to_string(),
        region: None,
        max_agents,
        token_param: TOKEN_PARAM.to_string(),
        counter_param: COUNTER_PARAM.to_string(),
    };

    let counter = DemandCounter::new(store.clone(), COUNTER_PARAM);
    let reconciler = Arc::new(Reconciler::new(
        counter,
        Arc::new(fleet.clone()),
        settings,
    ));

    let router = build_router(ApiState {
        secrets: store.clone(),
        reconciler,
        token_param: TOKEN_PARAM.to_string(),
    });

    Harness {
        store,
        fleet,
        router,
        _dir: dir,
    }
}

fn sign(body: &str) -> String {
    let mut mac =
        Hmac::<Sha512>::new_from_slice(SECRET.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn signed_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(SIGNATURE_HEADER, sign(body))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn status_body(status: &str) -> String {
    format!(
        r#"{{"run_id":"run-regression","notifications":[{{"run_status":"{status}"}}]}}"#
    )
}

async fn body_string(resp: Response<axum::body::Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn counter_value(store: &RedbParamStore) -> Option<String> {
    store.get(COUNTER_PARAM).await.unwrap()
}

#[tokio::test]
async fn get_is_liveness_only() {
    let h = harness(5).await;

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = h.router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(body_string(resp).await, "I'm here!");
    assert_eq!(counter_value(&h.store).await, None);
    assert!(h.fleet.updates().await.is_empty());
}

#[tokio::test]
async fn pending_run_scales_up() {
    let h = harness(5).await;

    let resp = h
        .router
        .oneshot(signed_post(&status_body("pending")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, r#"["Updated service count:",1]"#);
    assert_eq!(counter_value(&h.store).await, Some("1".to_string()));
    assert_eq!(h.fleet.desired("agents", "ci-agent").await, Some(1));
}

#[tokio::test]
async fn completed_run_scales_down_with_floor() {
    let h = harness(5).await;
    h.store.put(COUNTER_PARAM, "1").await.unwrap();

    let resp = h
        .router
        .clone()
        .oneshot(signed_post(&status_body("completed")))
        .await
        .unwrap();
    assert_eq!(body_string(resp).await, r#"["Updated service count:",0]"#);
    assert_eq!(counter_value(&h.store).await, Some("0".to_string()));

    // The floor holds on a duplicate delivery.
    let resp = h
        .router
        .oneshot(signed_post(&status_body("errored")))
        .await
        .unwrap();
    assert_eq!(body_string(resp).await, r#"["Updated service count:",0]"#);
    assert_eq!(counter_value(&h.store).await, Some("0".to_string()));
    assert_eq!(h.fleet.updates().await, vec![0, 0]);
}

#[tokio::test]
async fn demand_beyond_the_ceiling_stays_recorded() {
    let h = harness(5).await;
    h.store.put(COUNTER_PARAM, "10").await.unwrap();

    let resp = h
        .router
        .oneshot(signed_post(&status_body("pending")))
        .await
        .unwrap();
    assert_eq!(body_string(resp).await, r#"["Updated service count:",5]"#);
    // Queued demand exceeds capacity; the counter keeps the excess.
    assert_eq!(counter_value(&h.store).await, Some("11".to_string()));
    assert_eq!(h.fleet.desired("agents", "ci-agent").await, Some(5));
}

#[tokio::test]
async fn bad_signature_is_rejected_without_side_effects() {
    let h = harness(5).await;
    let body = status_body("pending");

    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header(SIGNATURE_HEADER, "0".repeat(128))
        .body(Body::from(body))
        .unwrap();
    let resp = h.router.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(resp).await, "Invalid HMAC");
    assert_eq!(counter_value(&h.store).await, None);
    assert!(h.fleet.updates().await.is_empty());
}

#[tokio::test]
async fn batched_entries_fold_into_one_update() {
    let h = harness(5).await;

    let body = r#"{"notifications":[
        {"run_status":"pending"},
        {"run_status":"pending"},
        {"run_status":"completed"}
    ]}"#;
    let resp = h.router.oneshot(signed_post(body)).await.unwrap();

    assert_eq!(body_string(resp).await, r#"["Updated service count:",1]"#);
    assert_eq!(counter_value(&h.store).await, Some("1".to_string()));
    assert_eq!(h.fleet.updates().await, vec![1]);
}

#[tokio::test]
async fn signed_ping_without_status_reports_liveness() {
    let h = harness(5).await;

    let resp = h
        .router
        .oneshot(signed_post(r#"{"notifications":[{"message":"setup ping"}]}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, r#""I'm here!""#);
    assert!(h.fleet.updates().await.is_empty());
}

#[tokio::test]
async fn demand_survives_a_daemon_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gantry.redb");

    {
        let store = RedbParamStore::open(&db_path).unwrap();
        store.put(COUNTER_PARAM, "4").await.unwrap();
    }

    // A fresh process over the same data directory sees the demand.
    let store = Arc::new(RedbParamStore::open(&db_path).unwrap());
    let counter = DemandCounter::new(store.clone(), COUNTER_PARAM);
    assert_eq!(counter.value().await.unwrap(), 4);
}
