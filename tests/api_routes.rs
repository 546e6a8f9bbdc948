mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

fn bali() -> serde_json::Value {
    json!({
        "name_en": "Bali",
        "name_ar": "بالي",
        "days": "5",
        "nights": "4",
        "people": "2",
        "price": "$1,200",
        "image": "/images/destinations/bali.jpg",
        "active": false
    })
}

#[tokio::test]
async fn test_lists_start_empty() {
    let (app, _) = test_app();
    for uri in ["/api/destinations", "/api/packages"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }
}

#[tokio::test]
async fn test_writes_need_session() {
    let (app, _) = test_app();
    let response = send_json(&app, "POST", "/api/destinations", None, bali()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({ "error": "Unauthorized" }));

    let response = send_json(&app, "DELETE", "/api/packages/abc", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let forged = Some("admin_session=eyJpc19sb2dnZWRfaW4iOnRydWV9.AAAA");
    let response = send_json(&app, "POST", "/api/packages", forged, json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let (app, _) = test_app();
    let response = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        json!({ "username": ADMIN_USER, "password": ADMIN_PASS }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = header(&response, "set-cookie").to_string();
    assert!(set_cookie.starts_with("admin_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert_eq!(body_json(response).await, json!({ "success": true }));
}

#[tokio::test]
async fn test_bad_login() {
    let (app, _) = test_app();
    let response = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        json!({ "username": ADMIN_USER, "password": "wrong" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get("set-cookie").is_none());
    assert_eq!(body_json(response).await["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_lockout() {
    let state = test_state(2);
    let app = state.router();
    for _ in 0..2 {
        let response = send_json(
            &app,
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": ADMIN_USER, "password": "wrong" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        json!({ "username": ADMIN_USER, "password": ADMIN_PASS }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["error"], "Too many attempts");
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let (app, _) = test_app();
    let response = send_json(&app, "POST", "/api/auth/logout", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(header(&response, "set-cookie").contains("Max-Age=0"));
}

#[tokio::test]
async fn test_create_destination() {
    let (app, _) = test_app();
    let cookie = login(&app).await;

    let response = send_json(&app, "POST", "/api/destinations", Some(&cookie), bali()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let row = body_json(response).await;
    assert_eq!(row["name_ar"], "بالي");
    // new destinations are always visible
    assert_eq!(row["active"], true);
    assert_eq!(row["display_order"], 0);
    assert_eq!(row["id"].as_str().unwrap().len(), 36);

    let id = row["id"].as_str().unwrap();
    let response = get(&app, &format!("/api/destinations/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["price"], "$1,200");
}

#[tokio::test]
async fn test_create_destination_missing_fields() {
    let (app, _) = test_app();
    let cookie = login(&app).await;
    let response = send_json(
        &app,
        "POST",
        "/api/destinations",
        Some(&cookie),
        json!({ "name_en": "Bali", "name_ar": "بالي" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(
        body["fields"],
        json!(["days", "nights", "people", "price", "image"])
    );
}

#[tokio::test]
async fn test_malformed_json() {
    let (app, _) = test_app();
    let cookie = login(&app).await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/packages")
        .header("content-type", "application/json")
        .header("cookie", &cookie)
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid request body");
}

#[tokio::test]
async fn test_update_and_visibility() {
    let (app, _) = test_app();
    let cookie = login(&app).await;
    let created = body_json(send_json(&app, "POST", "/api/destinations", Some(&cookie), bali()).await).await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/destinations/{id}");

    let response = send_json(
        &app,
        "PUT",
        &uri,
        Some(&cookie),
        json!({ "active": false, "price": "$999" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["active"], false);
    assert_eq!(updated["price"], "$999");
    assert_eq!(updated["name_en"], "Bali");
    assert_eq!(updated["created_at"], created["created_at"]);

    // hidden rows only show up for an admin asking for them
    let public = body_json(get(&app, "/api/destinations", None).await).await;
    assert_eq!(public, json!([]));
    let anonymous_all = body_json(get(&app, "/api/destinations?all=true", None).await).await;
    assert_eq!(anonymous_all, json!([]));
    let admin_all = body_json(get(&app, "/api/destinations?all=true", Some(&cookie)).await).await;
    assert_eq!(admin_all.as_array().unwrap().len(), 1);

    // still fetchable by id
    let response = get(&app, &uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_rejects_blank_required() {
    let (app, _) = test_app();
    let cookie = login(&app).await;
    let created = body_json(send_json(&app, "POST", "/api/destinations", Some(&cookie), bali()).await).await;
    let uri = format!("/api/destinations/{}", created["id"].as_str().unwrap());
    let response = send_json(&app, "PUT", &uri, Some(&cookie), json!({ "name_en": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_rows() {
    let (app, _) = test_app();
    let cookie = login(&app).await;

    let response = get(&app, "/api/destinations/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Destination not found" }));

    let response = send_json(&app, "PUT", "/api/packages/nope", Some(&cookie), json!({ "price": "1" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Package not found");
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (app, _) = test_app();
    let cookie = login(&app).await;
    let created = body_json(send_json(&app, "POST", "/api/destinations", Some(&cookie), bali()).await).await;
    let uri = format!("/api/destinations/{}", created["id"].as_str().unwrap());

    for _ in 0..2 {
        let response = send_json(&app, "DELETE", &uri, Some(&cookie), json!({})).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "success": true }));
    }
    assert_eq!(get(&app, &uri, None).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_package_defaults() {
    let (app, _) = test_app();
    let cookie = login(&app).await;
    let response = send_json(
        &app,
        "POST",
        "/api/packages",
        Some(&cookie),
        json!({ "name_en": "Umrah", "name_ar": "عمرة", "price": "$950" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let row = body_json(response).await;
    assert_eq!(row["active"], true);
    assert_eq!(row["display_order"], 0);
    assert_eq!(row["description_en"], "");

    let response = send_json(
        &app,
        "POST",
        "/api/packages",
        Some(&cookie),
        json!({ "name_en": "Draft", "name_ar": "مسودة", "price": "$1", "active": false }),
    )
    .await;
    assert_eq!(body_json(response).await["active"], false);

    let listed = body_json(get(&app, "/api/packages", None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_follows_display_order() {
    let (app, _) = test_app();
    let cookie = login(&app).await;
    for (name, order) in [("Third", json!(3)), ("First", json!(1)), ("Second", json!("2"))] {
        let body = json!({
            "name_en": name, "name_ar": name, "price": "$1", "display_order": order
        });
        let response = send_json(&app, "POST", "/api/packages", Some(&cookie), body).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let listed = body_json(get(&app, "/api/packages", None).await).await;
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name_en"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["First", "Second", "Third"]);
}

#[tokio::test]
async fn test_lockout_ignores_client_written_forwarded_hops() {
    let app = test_state_behind_proxy(2).router();
    let mut statuses = Vec::new();
    for i in 0..4 {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("content-type", "application/json")
            .header("x-forwarded-for", format!("198.51.100.{i}, 10.0.0.1"))
            .body(axum::body::Body::from(
                json!({ "username": ADMIN_USER, "password": "wrong" }).to_string(),
            ))
            .unwrap();
        statuses.push(send(&app, request).await.status());
    }
    assert_eq!(
        statuses,
        [
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
}

#[tokio::test]
async fn test_bad_list_query_is_json() {
    let (app, _) = test_app();
    for uri in [
        "/api/destinations?all=",
        "/api/destinations?all=1",
        "/api/packages?all=yes",
    ] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert!(header(&response, "content-type").starts_with("application/json"));
        assert_eq!(body_json(response).await, json!({ "error": "Invalid query string" }));
    }
}

#[tokio::test]
async fn test_overlong_fields_rejected() {
    let (app, state) = test_app();
    let cookie = login(&app).await;
    let mut body = bali();
    body["days"] = json!("5".repeat(40));
    let response = send_json(&app, "POST", "/api/destinations", Some(&cookie), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Fields too long", "fields": ["days"] })
    );
    assert!(state.store.list_destinations(true).await.unwrap().is_empty());
}
