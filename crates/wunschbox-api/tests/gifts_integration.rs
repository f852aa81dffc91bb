//! Integration tests for the gift catalog and reservation endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_gift, create_test_app, get_request_with_auth, invite_relative, json_request_with_auth,
    parse_response_body, register_parent, request_with_auth, send,
};
use serde_json::json;

#[tokio::test]
async fn test_create_gift_applies_defaults() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;

    let id = create_gift(&app, &parent, json!({ "childName": "Mia" })).await;

    let response = send(&app, get_request_with_auth(&format!("/api/gifts/{}", id), &parent.token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let gift = parse_response_body(response).await;
    assert_eq!(gift["title"], "Unbenannt");
    assert_eq!(gift["currency"], "CHF");
    assert_eq!(gift["priority"], "MEDIUM");
    assert_eq!(gift["isGifted"], false);
    assert!(gift.get("giftedByUserId").is_none());
}

#[tokio::test]
async fn test_relative_cannot_manage_catalog() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;
    let relative = invite_relative(&app, &parent, "Oma", "oma@example.ch").await;

    let response = send(
        &app,
        json_request_with_auth(
            Method::POST,
            "/api/gifts",
            json!({ "title": "LEGO", "childName": "Mia" }),
            &relative.token,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let id = create_gift(&app, &parent, json!({ "title": "LEGO", "childName": "Mia" })).await;
    let delete = send(
        &app,
        request_with_auth(Method::DELETE, &format!("/api/gifts/{}", id), &relative.token),
    )
    .await;
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reserve_then_second_reserve_conflicts() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;
    let oma = invite_relative(&app, &parent, "Oma", "oma@example.ch").await;
    let onkel = invite_relative(&app, &parent, "Onkel", "onkel@example.ch").await;
    let id = create_gift(&app, &parent, json!({ "title": "LEGO", "childName": "Mia" })).await;

    let first = send(
        &app,
        request_with_auth(Method::PUT, &format!("/api/gifts/{}/reserve", id), &oma.token),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let gift = parse_response_body(first).await;
    assert_eq!(gift["isGifted"], true);
    assert_eq!(gift["giftedByUserId"], oma.id.as_str());
    assert_eq!(gift["giftedByUserName"], "Oma");

    let second = send(
        &app,
        request_with_auth(Method::PUT, &format!("/api/gifts/{}/reserve", id), &onkel.token),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let unchanged = parse_response_body(
        send(&app, get_request_with_auth(&format!("/api/gifts/{}", id), &onkel.token)).await,
    )
    .await;
    assert_eq!(unchanged["giftedByUserId"], oma.id.as_str());
}

#[tokio::test]
async fn test_release_rules() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;
    let oma = invite_relative(&app, &parent, "Oma", "oma@example.ch").await;
    let onkel = invite_relative(&app, &parent, "Onkel", "onkel@example.ch").await;
    let id = create_gift(&app, &parent, json!({ "title": "LEGO", "childName": "Mia" })).await;
    let release_uri = format!("/api/gifts/{}/release", id);

    let not_reserved = send(&app, request_with_auth(Method::PUT, &release_uri, &oma.token)).await;
    assert_eq!(not_reserved.status(), StatusCode::CONFLICT);

    send(
        &app,
        request_with_auth(Method::PUT, &format!("/api/gifts/{}/reserve", id), &oma.token),
    )
    .await;

    let foreign = send(&app, request_with_auth(Method::PUT, &release_uri, &onkel.token)).await;
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);

    let own = send(&app, request_with_auth(Method::PUT, &release_uri, &oma.token)).await;
    assert_eq!(own.status(), StatusCode::OK);
    let gift = parse_response_body(own).await;
    assert_eq!(gift["isGifted"], false);
    assert!(gift.get("giftedByUserId").is_none());
    assert!(gift.get("giftedByUserName").is_none());
}

#[tokio::test]
async fn test_parent_can_release_any_reservation() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;
    let oma = invite_relative(&app, &parent, "Oma", "oma@example.ch").await;
    let id = create_gift(&app, &parent, json!({ "title": "LEGO", "childName": "Mia" })).await;

    send(
        &app,
        request_with_auth(Method::PUT, &format!("/api/gifts/{}/reserve", id), &oma.token),
    )
    .await;
    let response = send(
        &app,
        request_with_auth(Method::PUT, &format!("/api/gifts/{}/release", id), &parent.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_proxy_mark_records_name_without_notification() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;
    let id = create_gift(&app, &parent, json!({ "title": "Malset", "childName": "Mia" })).await;

    let response = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &format!("/api/gifts/{}/proxy", id),
            json!({ "proxyName": "  Tante Vreni " }),
            &parent.token,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let gift = parse_response_body(response).await;
    assert_eq!(gift["isGifted"], true);
    assert_eq!(gift["giftedByUserName"], "Tante Vreni");
    assert_eq!(gift["giftedByUserId"], parent.id.as_str());

    let again = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &format!("/api/gifts/{}/proxy", id),
            json!({ "proxyName": "Götti" }),
            &parent.token,
        ),
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let notifications =
        parse_response_body(send(&app, get_request_with_auth("/api/notifications", &parent.token)).await)
            .await;
    assert_eq!(notifications.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_edit_keeps_identity_and_reservation() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;
    let oma = invite_relative(&app, &parent, "Oma", "oma@example.ch").await;
    let id = create_gift(&app, &parent, json!({ "title": "Old", "childName": "Mia" })).await;

    send(
        &app,
        request_with_auth(Method::PUT, &format!("/api/gifts/{}/reserve", id), &oma.token),
    )
    .await;
    let before =
        parse_response_body(send(&app, get_request_with_auth(&format!("/api/gifts/{}", id), &parent.token)).await)
            .await;

    let response = send(
        &app,
        json_request_with_auth(
            Method::PUT,
            &format!("/api/gifts/{}", id),
            json!({ "id": "x", "createdAt": 999, "isGifted": false, "title": "New" }),
            &parent.token,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let after = parse_response_body(response).await;
    assert_eq!(after["id"], id.as_str());
    assert_eq!(after["title"], "New");
    assert_eq!(after["createdAt"], before["createdAt"]);
    assert_eq!(after["isGifted"], true);
    assert_eq!(after["giftedByUserId"], oma.id.as_str());
}

#[tokio::test]
async fn test_list_orders_and_filters() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;
    let oma = invite_relative(&app, &parent, "Oma", "oma@example.ch").await;

    let lego = create_gift(
        &app,
        &parent,
        json!({ "title": "LEGO", "childName": "Mia", "priority": "HIGH", "category": "Spielzeug" }),
    )
    .await;
    create_gift(
        &app,
        &parent,
        json!({ "title": "Malset", "childName": "Mia", "priority": "LOW", "category": "Sonstiges" }),
    )
    .await;
    create_gift(
        &app,
        &parent,
        json!({ "title": "Buch", "childName": "Leo", "priority": "HIGH", "category": "Bücher" }),
    )
    .await;

    send(
        &app,
        request_with_auth(Method::PUT, &format!("/api/gifts/{}/reserve", lego), &oma.token),
    )
    .await;

    let all = parse_response_body(send(&app, get_request_with_auth("/api/gifts", &oma.token)).await).await;
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Buch", "Malset", "LEGO"]);

    let mia = parse_response_body(send(&app, get_request_with_auth("/api/gifts?child=Mia", &oma.token)).await)
        .await;
    assert_eq!(mia.as_array().unwrap().len(), 2);

    let crafts = parse_response_body(
        send(&app, get_request_with_auth("/api/gifts?category=Sonstiges", &oma.token)).await,
    )
    .await;
    assert_eq!(crafts.as_array().unwrap().len(), 1);
    assert_eq!(crafts[0]["title"], "Malset");
}

#[tokio::test]
async fn test_unknown_gift_is_not_found() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;
    let missing = uuid::Uuid::new_v4();

    let response = send(
        &app,
        request_with_auth(Method::PUT, &format!("/api/gifts/{}/reserve", missing), &parent.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_gift_body_is_validation_error() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;

    let response = send(
        &app,
        json_request_with_auth(Method::POST, "/api/gifts", json!({ "title": "LEGO" }), &parent.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("childName"));

    let bad_priority = send(
        &app,
        json_request_with_auth(
            Method::POST,
            "/api/gifts",
            json!({ "title": "LEGO", "childName": "Mia", "priority": "URGENT" }),
            &parent.token,
        ),
    )
    .await;
    assert_eq!(bad_priority.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_response_body(bad_priority).await["error"], "validation_error");
}

#[tokio::test]
async fn test_unknown_category_filter_is_validation_error() {
    let app = create_test_app();
    let parent = register_parent(&app, "Anna", "anna@example.ch").await;

    let response = send(&app, get_request_with_auth("/api/gifts?category=Basteln", &parent.token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_response_body(response).await["error"], "validation_error");
}
