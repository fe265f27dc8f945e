use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ecoloop::api::rest::router;
use ecoloop::engine::DEFAULT_MAX_CAPACITY_KG;
use ecoloop::models::policy::ScoringPolicy;
use ecoloop::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn new_state() -> Arc<AppState> {
    Arc::new(AppState::new(
        ScoringPolicy::default(),
        DEFAULT_MAX_CAPACITY_KG,
        1024,
    ))
}

fn setup() -> axum::Router {
    router(new_state())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn create_user(app: &axum::Router, name: &str, role: &str) -> String {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users",
            json!({
                "full_name": name,
                "email": format!("{}@ecoloop.test", name.to_lowercase()),
                "role": role
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await["id"].as_str().unwrap().to_string()
}

/// Creates a station; the response carries its three bins.
async fn create_station(app: &axum::Router, name: &str) -> Value {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/stations",
            json!({ "name": name, "location": "Plaza Central" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await
}

fn bin_of(station: &Value, waste_type: &str) -> Value {
    station["bins"]
        .as_array()
        .unwrap()
        .iter()
        .find(|bin| bin["waste_type"] == waste_type)
        .cloned()
        .unwrap()
}

async fn deposit(app: &axum::Router, bin_id: &str, body: Value) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/bins/{bin_id}/deposits"),
            body,
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stations"], 0);
    assert_eq!(body["bins"], 0);
    assert_eq!(body["users"], 0);
    assert_eq!(body["transactions"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("bins_needing_attention"));
}

#[tokio::test]
async fn create_station_provisions_three_empty_bins() {
    let app = setup();
    let station = create_station(&app, "Parque Norte").await;

    assert_eq!(station["name"], "Parque Norte");
    let bins = station["bins"].as_array().unwrap();
    assert_eq!(bins.len(), 3);

    let station_id = station["id"].as_str().unwrap();
    for (waste_type, tag) in [
        ("recyclable", "RECYCLABLE"),
        ("organic", "ORGANIC"),
        ("non_recyclable", "NONRECYCLABLE"),
    ] {
        let bin = bin_of(&station, waste_type);
        assert_eq!(bin["current_mass_kg"], 0.0);
        assert_eq!(bin["capacity_percentage"], 0);
        assert_eq!(bin["needs_attention"], false);
        let qr = bin["qr_code"].as_str().unwrap();
        assert!(qr.starts_with(&format!("ECOLOOP-{station_id}-{tag}-")));
    }
}

#[tokio::test]
async fn create_station_empty_name_returns_400() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/stations",
            json!({ "name": "  ", "location": "Somewhere" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_finds_bin_by_qr_code() {
    let app = setup();
    let station = create_station(&app, "Mercado").await;
    let bin = bin_of(&station, "organic");
    let qr = bin["qr_code"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(get_request(&format!("/scan/{qr}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["id"], bin["id"]);

    let res = app.oneshot(get_request("/scan/NOT-A-BIN")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deposit_awards_points_and_fills_bin() {
    let app = setup();
    let user = create_user(&app, "Lucia", "user").await;
    let station = create_station(&app, "Biblioteca").await;
    let bin = bin_of(&station, "recyclable");
    let bin_id = bin["id"].as_str().unwrap();

    let res = deposit(&app, bin_id, json!({ "user_id": user, "mass_kg": 2.5 })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["transaction"]["points_awarded"], 15);
    assert_eq!(body["transaction"]["mass_kg"], 2.5);
    assert_eq!(body["transaction"]["waste_type"], "recyclable");
    assert_eq!(body["transaction"]["user_id"], user);
    assert_eq!(body["bin"]["current_mass_kg"], 2.5);
    assert_eq!(body["bin"]["capacity_percentage"], 2);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/users/{user}")))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["eco_points"], 15);

    let res = app
        .oneshot(get_request(&format!("/users/{user}/transactions")))
        .await
        .unwrap();
    let transactions = body_json(res).await;
    assert_eq!(transactions.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn overflowing_deposit_is_clamped_and_then_bin_is_full() {
    let app = setup();
    let user = create_user(&app, "Mateo", "user").await;
    let station = create_station(&app, "Estadio").await;
    let bin = bin_of(&station, "recyclable");
    let bin_id = bin["id"].as_str().unwrap();

    let res = deposit(&app, bin_id, json!({ "user_id": user, "mass_kg": 119.0 })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = deposit(&app, bin_id, json!({ "user_id": user, "mass_kg": 5.0 })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["transaction"]["mass_kg"], 1.0);
    assert_eq!(body["transaction"]["points_awarded"], 12);
    assert_eq!(body["bin"]["current_mass_kg"], 120.0);
    assert_eq!(body["bin"]["capacity_percentage"], 100);
    assert_eq!(body["bin"]["needs_attention"], true);

    let res = deposit(&app, bin_id, json!({ "user_id": user, "mass_kg": 0.5 })).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // 10 + 119 * 2.0 = 248, then 12 for the clamped kilogram
    let res = app
        .oneshot(get_request(&format!("/users/{user}")))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["eco_points"], 260);
}

#[tokio::test]
async fn deposit_with_invalid_mass_returns_400() {
    let app = setup();
    let user = create_user(&app, "Sofia", "user").await;
    let station = create_station(&app, "Escuela").await;
    let bin_id = bin_of(&station, "organic")["id"].as_str().unwrap().to_string();

    for mass in [0.0, -3.0] {
        let res = deposit(&app, &bin_id, json!({ "user_id": user, "mass_kg": mass })).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn deposit_with_other_waste_type_returns_400() {
    let app = setup();
    let user = create_user(&app, "Diego", "user").await;
    let station = create_station(&app, "Hospital").await;
    let bin_id = bin_of(&station, "organic")["id"].as_str().unwrap().to_string();

    let res = deposit(
        &app,
        &bin_id,
        json!({ "user_id": user, "mass_kg": 1.0, "waste_type": "recyclable" }),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deposit_to_unknown_bin_returns_404() {
    let app = setup();
    let user = create_user(&app, "Elena", "user").await;
    let fake_id = "00000000-0000-0000-0000-000000000000";

    let res = deposit(&app, fake_id, json!({ "user_id": user, "mass_kg": 1.0 })).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn worker_empties_bin_that_needs_attention() {
    let app = setup();
    let user = create_user(&app, "Pablo", "user").await;
    let worker = create_user(&app, "Rosa", "worker").await;
    let station = create_station(&app, "Terminal").await;
    let bin_id = bin_of(&station, "non_recyclable")["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = deposit(&app, &bin_id, json!({ "user_id": user, "mass_kg": 96.0 })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(get_request("/bins?needs_attention=true"))
        .await
        .unwrap();
    let flagged = body_json(res).await;
    assert_eq!(flagged.as_array().unwrap().len(), 1);
    assert_eq!(flagged[0]["capacity_percentage"], 80);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/bins/{bin_id}/empty"),
            json!({ "worker_id": user }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/bins/{bin_id}/empty"),
            json!({ "worker_id": worker }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bin = body_json(res).await;
    assert_eq!(bin["current_mass_kg"], 0.0);
    assert_eq!(bin["needs_attention"], false);

    let res = app
        .oneshot(get_request("/bins?needs_attention=true"))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn deleting_station_removes_its_bins() {
    let app = setup();
    let station = create_station(&app, "Puerto").await;
    let station_id = station["id"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/stations/{station_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.oneshot(get_request("/health")).await.unwrap();
    let body = body_json(res).await;
    assert_eq!(body["stations"], 0);
    assert_eq!(body["bins"], 0);
}

#[tokio::test]
async fn redeem_requires_enough_points() {
    let app = setup();
    let user = create_user(&app, "Ines", "user").await;
    let station = create_station(&app, "Museo").await;
    let bin_id = bin_of(&station, "recyclable")["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({
                "name": "Tote bag",
                "category": "accessories",
                "points_cost": 20,
                "stock": 1
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let product_id = body_json(res).await["id"].as_str().unwrap().to_string();
    let redeem_uri = format!("/products/{product_id}/redeem");

    let res = app
        .clone()
        .oneshot(json_request("POST", &redeem_uri, json!({ "user_id": user })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // 10 + 10kg * 2.0 = 30 points
    let res = deposit(&app, &bin_id, json!({ "user_id": user, "mass_kg": 10.0 })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request("POST", &redeem_uri, json!({ "user_id": user })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let redemption = body_json(res).await;
    assert_eq!(redemption["points_spent"], 20);
    assert_eq!(redemption["status"], "pending");

    let res = app
        .clone()
        .oneshot(get_request(&format!("/users/{user}")))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["eco_points"], 10);

    let res = app
        .oneshot(json_request("POST", &redeem_uri, json!({ "user_id": user })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn duplicate_email_returns_409() {
    let app = setup();
    create_user(&app, "Carla", "user").await;

    let res = app
        .oneshot(json_request(
            "POST",
            "/users",
            json!({ "full_name": "Carla Two", "email": "CARLA@ecoloop.test" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn deposits_publish_bin_events() {
    let state = new_state();
    let mut events = state.bin_events_tx.subscribe();
    let app = router(state.clone());

    let user = create_user(&app, "Tomas", "user").await;
    let station = create_station(&app, "Mirador").await;
    let bin_id = bin_of(&station, "organic")["id"].as_str().unwrap().to_string();

    let res = deposit(&app, &bin_id, json!({ "user_id": user, "mass_kg": 100.0 })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let deposited = serde_json::to_value(events.recv().await.unwrap()).unwrap();
    assert_eq!(deposited["kind"], "deposited");
    assert_eq!(deposited["points_awarded"], 158);

    let raised = serde_json::to_value(events.recv().await.unwrap()).unwrap();
    assert_eq!(raised["kind"], "attention_raised");
    assert_eq!(raised["capacity_percentage"], 83);
}

#[tokio::test]
async fn quiz_completion_earns_points_once() {
    let app = setup();
    let user = create_user(&app, "Nora", "user").await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/quizzes",
            json!({
                "title": "Which bin?",
                "points_reward": 50,
                "questions": [
                    { "question": "Banana peel", "options": ["recyclable", "organic"], "correct_answer": 1 },
                    { "question": "Glass jar", "options": ["recyclable", "organic"], "correct_answer": 0 },
                    { "question": "Eggshells", "options": ["recyclable", "organic"], "correct_answer": 1 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let quiz = body_json(res).await;
    assert!(quiz["questions"][0].get("correct_answer").is_none());
    let completion_uri = format!("/quizzes/{}/completions", quiz["id"].as_str().unwrap());

    // Two of three correct: round(2 / 3 * 50) = 33
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &completion_uri,
            json!({ "user_id": user, "answers": [1, 0, 0] }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let completion = body_json(res).await;
    assert_eq!(completion["score"], 2);
    assert_eq!(completion["points_earned"], 33);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &completion_uri,
            json!({ "user_id": user, "answers": [1, 0, 1] }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/users/{user}")))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["eco_points"], 33);

    let res = app
        .oneshot(get_request(&format!("/users/{user}/quiz-completions")))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn quiz_with_out_of_range_answer_key_returns_400() {
    let app = setup();

    let res = app
        .oneshot(json_request(
            "POST",
            "/quizzes",
            json!({
                "title": "Broken",
                "points_reward": 10,
                "questions": [
                    { "question": "Q", "options": ["a", "b"], "correct_answer": 2 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
