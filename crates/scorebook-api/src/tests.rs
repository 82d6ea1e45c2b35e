//! Router tests against an in-memory store.

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Method, Request, StatusCode},
};
use scorebook_core::{cache::CachedStore, store::ScoreStore};
use scorebook_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> (Router, CachedStore<SqliteStore>) {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  let cached = CachedStore::new(store, Duration::from_secs(600));
  (api_router(Arc::new(cached.clone())), cached)
}

async fn call(
  app: &Router,
  method: Method,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(v) => builder
      .header("content-type", "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn seeded_league(app: &Router) -> i64 {
  let (status, league) = call(
    app,
    Method::POST,
    "/leagues",
    Some(json!({ "name": "Oficina", "season": "2025/2026" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = league["id"].as_i64().unwrap();

  for (player, round, points) in [
    ("Ana", 1, 10),
    ("Ana", 2, 4),
    ("Luis", 1, 7),
    ("Luis", 2, 12),
  ] {
    let (status, _) = call(
      app,
      Method::PUT,
      &format!("/leagues/{id}/points"),
      Some(json!({ "player": player, "round": round, "points": points })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
  }
  id
}

// ─── Leagues ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_list_leagues() {
  let (app, _) = app().await;

  let (status, _) =
    call(&app, Method::POST, "/leagues", Some(json!({ "name": "Zeta" }))).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, created) = call(
    &app,
    Method::POST,
    "/leagues",
    Some(json!({ "name": "Alfa", "season": "2024" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["season"], "2024");

  let (status, list) = call(&app, Method::GET, "/leagues", None).await;
  assert_eq!(status, StatusCode::OK);
  let names: Vec<&str> =
    list.as_array().unwrap().iter().map(|l| l["name"].as_str().unwrap()).collect();
  assert_eq!(names, ["Alfa", "Zeta"]);
}

#[tokio::test]
async fn duplicate_league_is_conflict() {
  let (app, _) = app().await;
  call(&app, Method::POST, "/leagues", Some(json!({ "name": "Oficina" }))).await;

  let (status, body) =
    call(&app, Method::POST, "/leagues", Some(json!({ "name": "Oficina" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("Oficina"));
}

#[tokio::test]
async fn blank_league_name_is_bad_request() {
  let (app, _) = app().await;
  let (status, _) =
    call(&app, Method::POST, "/leagues", Some(json!({ "name": "  " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_league_removes_points() {
  let (app, store) = app().await;
  let id = seeded_league(&app).await;

  let (status, body) =
    call(&app, Method::DELETE, &format!("/leagues/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["removed_points"], 4);
  assert!(store.list_leagues().await.unwrap().is_empty());

  let (status, _) =
    call(&app, Method::DELETE, &format!("/leagues/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Players ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_player_appears_on_the_roster() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, _) = call(
    &app,
    Method::POST,
    &format!("/leagues/{id}/players"),
    Some(json!({ "name": "Bea" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, roster) =
    call(&app, Method::GET, &format!("/leagues/{id}/players"), None).await;
  assert_eq!(roster, json!(["Ana", "Bea", "Luis"]));

  let (status, _) = call(
    &app,
    Method::POST,
    &format!("/leagues/{id}/players"),
    Some(json!({ "name": "Bea" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn player_in_unknown_league_is_not_found() {
  let (app, _) = app().await;
  let (status, _) = call(
    &app,
    Method::POST,
    "/leagues/99/players",
    Some(json!({ "name": "Bea" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rename_and_delete_player() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, body) = call(
    &app,
    Method::POST,
    &format!("/leagues/{id}/players/Ana/rename"),
    Some(json!({ "new_name": "Anabel" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["renamed_rows"], 2);

  let (status, _) = call(
    &app,
    Method::POST,
    &format!("/leagues/{id}/players/Anabel/rename"),
    Some(json!({ "new_name": "Luis" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, body) =
    call(&app, Method::DELETE, &format!("/leagues/{id}/players/Luis"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["removed_points"], 2);

  let (_, roster) =
    call(&app, Method::GET, &format!("/leagues/{id}/players"), None).await;
  assert_eq!(roster, json!(["Anabel"]));
}

// ─── Rounds ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn round_summary_reports_next_round() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, body) =
    call(&app, Method::GET, &format!("/leagues/{id}/rounds"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "max_round": 2, "next_round": 3 }));
}

#[tokio::test]
async fn sheet_defaults_missing_rows_to_zero() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, sheet) =
    call(&app, Method::GET, &format!("/leagues/{id}/rounds/3"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    sheet,
    json!([
      { "player": "Ana", "points": 0, "stored": false },
      { "player": "Luis", "points": 0, "stored": false },
    ])
  );

  let (status, _) =
    call(&app, Method::GET, &format!("/leagues/{id}/rounds/0"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_round_writes_every_score() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, body) = call(
    &app,
    Method::PUT,
    &format!("/leagues/{id}/rounds/3"),
    Some(json!({ "scores": [
      { "player": "Ana", "points": 8 },
      { "player": "Luis", "points": 3 },
    ]})),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "round": 3, "written": 2 }));

  let (_, sheet) =
    call(&app, Method::GET, &format!("/leagues/{id}/rounds/3"), None).await;
  assert_eq!(sheet[0], json!({ "player": "Ana", "points": 8, "stored": true }));
}

#[tokio::test]
async fn failed_submission_reports_rows_written() {
  let (app, store) = app().await;
  let id = seeded_league(&app).await;

  let (status, body) = call(
    &app,
    Method::PUT,
    &format!("/leagues/{id}/rounds/3"),
    Some(json!({ "scores": [
      { "player": "Ana", "points": 8 },
      { "player": "Luis", "points": -1 },
      { "player": "Bea", "points": 5 },
    ]})),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["written"], 1);

  let league = scorebook_core::league::LeagueId(id);
  let round = store.points_for_round(league, 3).await.unwrap();
  assert_eq!(round.len(), 1);
  assert_eq!(round.get("Ana"), Some(&8));
}

#[tokio::test]
async fn submission_with_blank_player_is_rejected() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, body) = call(
    &app,
    Method::PUT,
    &format!("/leagues/{id}/rounds/3"),
    Some(json!({ "scores": [{ "player": "", "points": 3 }] })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["written"], 0);

  let (_, roster) =
    call(&app, Method::GET, &format!("/leagues/{id}/players"), None).await;
  assert_eq!(roster, json!(["Ana", "Luis"]));
}

#[tokio::test]
async fn upsert_overwrites_existing_cell() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, _) = call(
    &app,
    Method::PUT,
    &format!("/leagues/{id}/points"),
    Some(json!({ "player": "Ana", "round": 1, "points": 20 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (_, sheet) =
    call(&app, Method::GET, &format!("/leagues/{id}/rounds/1"), None).await;
  assert_eq!(sheet[0]["points"], 20);
}

#[tokio::test]
async fn upsert_rejects_negative_points() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, _) = call(
    &app,
    Method::PUT,
    &format!("/leagues/{id}/points"),
    Some(json!({ "player": "Ana", "round": 1, "points": -3 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn averages_are_per_round() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, body) =
    call(&app, Method::GET, &format!("/leagues/{id}/rounds/averages"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body,
    json!([{ "round": 1, "average": 8.5 }, { "round": 2, "average": 8.0 }])
  );
}

// ─── Standings ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn leaderboard_total_and_range() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, board) =
    call(&app, Method::GET, &format!("/leagues/{id}/leaderboard"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(board[0]["player"], "Luis");
  assert_eq!(board[0]["total"], 19);
  assert_eq!(board[1]["player"], "Ana");

  let (_, board) = call(
    &app,
    Method::GET,
    &format!("/leagues/{id}/leaderboard?start=1&end=1"),
    None,
  )
  .await;
  assert_eq!(board[0]["player"], "Ana");
  assert_eq!(board[0]["total"], 10);
}

#[tokio::test]
async fn leaderboard_rejects_bad_ranges() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  for query in ["start=3&end=1", "start=1"] {
    let (status, _) = call(
      &app,
      Method::GET,
      &format!("/leagues/{id}/leaderboard?{query}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "query {query}");
  }
}

#[tokio::test]
async fn records_honour_limit() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (_, records) =
    call(&app, Method::GET, &format!("/leagues/{id}/records?limit=2"), None).await;
  assert_eq!(
    records,
    json!([
      { "player": "Luis", "round": 2, "points": 12 },
      { "player": "Ana", "round": 1, "points": 10 },
    ])
  );

  let (status, _) =
    call(&app, Method::GET, &format!("/leagues/{id}/records?limit=0"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn best_record_is_top_score_or_null() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, best) =
    call(&app, Method::GET, &format!("/leagues/{id}/records/best"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(best, json!({ "player": "Luis", "round": 2, "points": 12 }));

  let (_, league) =
    call(&app, Method::POST, "/leagues", Some(json!({ "name": "Vacia" }))).await;
  let empty = league["id"].as_i64().unwrap();
  let (status, best) =
    call(&app, Method::GET, &format!("/leagues/{empty}/records/best"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(best, Value::Null);
}

#[tokio::test]
async fn search_by_criterion() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, body) = call(
    &app,
    Method::GET,
    &format!("/leagues/{id}/search?player=Ana&op=gt&threshold=5"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["comparison"], ">");
  assert_eq!(body["count"], 1);
  assert_eq!(body["rounds"], json!([{ "round": 1, "points": 10 }]));

  let (status, _) = call(
    &app,
    Method::GET,
    &format!("/leagues/{id}/search?player=Ana&op=like&threshold=5"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pivot_includes_headers_and_totals() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (status, body) =
    call(&app, Method::GET, &format!("/leagues/{id}/pivot"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["headers"], json!(["J1", "J2", "TOTAL"]));
  assert_eq!(body["rounds"], json!([1, 2]));
  assert_eq!(body["rows"][0]["player"], "Luis");
  assert_eq!(body["rows"][0]["total"], 19);
}

#[tokio::test]
async fn writes_through_the_api_refresh_cached_reads() {
  let (app, _) = app().await;
  let id = seeded_league(&app).await;

  let (_, before) =
    call(&app, Method::GET, &format!("/leagues/{id}/leaderboard"), None).await;
  assert_eq!(before[0]["player"], "Luis");

  call(
    &app,
    Method::PUT,
    &format!("/leagues/{id}/points"),
    Some(json!({ "player": "Ana", "round": 3, "points": 30 })),
  )
  .await;

  let (_, after) =
    call(&app, Method::GET, &format!("/leagues/{id}/leaderboard"), None).await;
  assert_eq!(after[0]["player"], "Ana");
  assert_eq!(after[0]["total"], 44);
}
