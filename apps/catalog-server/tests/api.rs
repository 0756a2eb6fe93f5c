//! HTTP-level tests for the catalogue API.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use catalog_server::{create_app, create_state};
use catalog_store::{MemoryCatalogStore, SqliteCatalogStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn memory_app() -> Router {
    create_app(create_state(MemoryCatalogStore::new()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

fn seven() -> Value {
    json!({
        "name": "Seven",
        "description": "Two detectives hunt a serial killer",
        "releaseDate": "1995-09-22",
        "duration": 127,
        "mpa": { "id": 4 },
        "genres": [{ "id": 4 }, { "id": 2 }]
    })
}

fn user(login: &str) -> Value {
    json!({
        "email": format!("{login}@mail.ru"),
        "login": login,
        "name": "",
        "birthday": "1990-01-01"
    })
}

async fn create_user(app: &Router, login: &str) -> i64 {
    let (status, body) = send(app, Method::POST, "/users", Some(user(login))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_film_round_trip() {
    let app = memory_app();

    let (status, created) = send(&app, Method::POST, "/films", Some(seven())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["releaseDate"], "1995-09-22");
    assert_eq!(created["mpa"], json!({ "id": 4, "name": "R" }));
    assert_eq!(
        created["genres"],
        json!([{ "id": 2, "name": "Drama" }, { "id": 4, "name": "Thriller" }])
    );
    assert_eq!(created["likes"], json!([]));

    let (status, fetched) = send(&app, Method::GET, "/films/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, all) = send(&app, Method::GET, "/films", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all, json!([created]));
}

#[tokio::test]
async fn test_film_validation_errors() {
    let app = memory_app();

    let mut early = seven();
    early["releaseDate"] = json!("1895-12-27");
    let (status, body) = send(&app, Method::POST, "/films", Some(early)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert!(body["errorMessage"].as_str().unwrap().contains("1895-12-27"));

    let mut blank = seven();
    blank["name"] = json!("");
    let (status, body) = send(&app, Method::POST, "/films", Some(blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["violations"][0]["fieldName"], "name");
    assert_eq!(body["violations"][0]["message"], "must not be empty");

    let mut floor = seven();
    floor["releaseDate"] = json!("1895-12-28");
    let (status, _) = send(&app, Method::POST, "/films", Some(floor)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_malformed_bodies_are_validation_errors() {
    let app = memory_app();

    let mut bad_date = seven();
    bad_date["releaseDate"] = json!("not-a-date");
    let (status, body) = send(&app, Method::POST, "/films", Some(bad_date)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert!(body["errorMessage"].is_string());

    let mut bad_duration = seven();
    bad_duration["duration"] = json!("eighty");
    let (status, body) = send(&app, Method::PUT, "/films", Some(bad_duration)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{\"login\":"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, films) = send(&app, Method::GET, "/films", None).await;
    assert_eq!(films, json!([]));
}

#[tokio::test]
async fn test_user_creation_ignores_friend_statuses() {
    let app = memory_app();
    let a = create_user(&app, "a").await;

    let mut payload = user("b");
    payload["friendsStatuses"] = json!({ a.to_string(): "REJECTED" });
    let (status, body) = send(&app, Method::POST, "/users", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["friendsStatuses"], json!({}));
}

#[tokio::test]
async fn test_unknown_ids_return_not_found() {
    let app = memory_app();

    let (status, body) = send(&app, Method::GET, "/films/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Incorrect film or user id");
    assert!(body["errorMessage"].as_str().unwrap().contains("42"));

    let (status, _) = send(&app, Method::GET, "/users/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut update = seven();
    update["id"] = json!(42);
    let (status, _) = send(&app, Method::PUT, "/films", Some(update)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, "/films/1/like/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_popular_films() {
    let app = memory_app();
    let fan = create_user(&app, "fan").await;

    for name in ["A", "B", "C"] {
        let mut film = seven();
        film["name"] = json!(name);
        send(&app, Method::POST, "/films", Some(film)).await;
    }

    let (status, _) = send(&app, Method::PUT, &format!("/films/3/like/{fan}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/films/popular", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["C", "A", "B"]);
    assert_eq!(body[0]["likes"], json!([fan]));

    let (status, body) = send(&app, Method::GET, "/films/popular?count=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/films/popular?count=-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, Method::GET, "/films/popular?count=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");

    let (status, _) = send(&app, Method::DELETE, &format!("/films/3/like/{fan}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &format!("/films/3/like/{fan}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_name_defaults_to_login() {
    let app = memory_app();

    let (status, body) = send(&app, Method::POST, "/users", Some(user("dolore"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "dolore");
    assert_eq!(body["friendsStatuses"], json!({}));

    let mut bad = user("dolore ullamco");
    bad["email"] = json!("mail.ru");
    let (status, body) = send(&app, Method::POST, "/users", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["fieldName"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["email", "login"]);
}

#[tokio::test]
async fn test_friendship_endpoints() {
    let app = memory_app();
    let a = create_user(&app, "a").await;
    let b = create_user(&app, "b").await;
    let c = create_user(&app, "c").await;

    let (status, _) = send(&app, Method::GET, &format!("/users/{a}/friends"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for (user, friend) in [(a, c), (b, c), (a, b)] {
        let uri = format!("/users/{user}/friends/{friend}");
        let (status, _) = send(&app, Method::PUT, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(&app, Method::PUT, &format!("/users/{a}/friends/{a}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::PUT, &format!("/users/{a}/friends/{b}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, &format!("/users/{a}"), None).await;
    assert_eq!(body["friendsStatuses"][b.to_string()], "CONFIRMED");

    let (status, body) = send(&app, Method::GET, &format!("/users/{a}/friends"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let uri = format!("/users/{a}/friends/common/{b}");
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], c);

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{a}/friends/{c}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_lookup_endpoints() {
    let app = memory_app();

    let (status, body) = send(&app, Method::GET, "/genres", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);
    assert_eq!(body[0], json!({ "id": 1, "name": "Comedy" }));

    let (status, body) = send(&app, Method::GET, "/mpa/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 3, "name": "PG-13" }));

    let (status, _) = send(&app, Method::GET, "/genres/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, "/mpa/0", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_sqlite_backed_app_cascades_deletes() {
    let store = SqliteCatalogStore::in_memory().await.unwrap();
    let app = create_app(create_state(store));
    let fan = create_user(&app, "fan").await;

    let (status, film) = send(&app, Method::POST, "/films", Some(seven())).await;
    assert_eq!(status, StatusCode::CREATED);
    let film_id = film["id"].as_i64().unwrap();

    let uri = format!("/films/{film_id}/like/{fan}");
    assert_eq!(send(&app, Method::PUT, &uri, None).await.0, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{fan}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, &format!("/films/{film_id}"), None).await;
    assert_eq!(body["likes"], json!([]));

    let (status, _) = send(&app, Method::DELETE, "/films", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::GET, "/films", None).await;
    assert_eq!(body, json!([]));
}
