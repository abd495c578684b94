mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use tillpoint::db::UserRole;

#[tokio::test]
async fn test_item_reads_are_public() {
    let ctx = setup().await;
    ctx.db
        .items()
        .create("Flat White", "Double shot", 450)
        .await
        .unwrap();

    let response = get(&ctx.app, "/api/items").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Flat White");
    assert_eq!(items[0]["cost"], "4.50");
}

#[tokio::test]
async fn test_get_unknown_item_is_not_found() {
    let ctx = setup().await;

    let response = get(&ctx.app, "/api/items/no-such-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_item_requires_store_role() {
    let ctx = setup().await;
    create_user(&ctx.db, "customer@example.com", UserRole::User).await;

    let payload = json!({ "name": "Flat White", "cost": "4.50" });

    // No token at all.
    let response = post_json(&ctx.app, "/api/items", &payload).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Valid token, wrong role.
    let token = login(&ctx.app, "customer@example.com").await;
    let response = post_json_auth(&ctx.app, "/api/items", &payload, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleted_user_is_locked_out_before_token_expiry() {
    let ctx = setup().await;
    let user = create_user(&ctx.db, "owner@example.com", UserRole::Store).await;
    let token = login(&ctx.app, "owner@example.com").await;

    ctx.db.users().delete(&user.id).await.unwrap();

    let response = post_json_auth(
        &ctx.app,
        "/api/items",
        &json!({ "name": "Flat White", "cost": "4.50" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_store_user_can_create_item_with_bearer_token() {
    let ctx = setup().await;
    create_user(&ctx.db, "owner@example.com", UserRole::Store).await;
    let token = login(&ctx.app, "owner@example.com").await;

    let response = post_json_auth(
        &ctx.app,
        "/api/items",
        &json!({ "name": "Flat White", "description": "Double shot", "cost": "4.50" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    let id = body["id"].as_str().unwrap();

    let fetched = get(&ctx.app, &format!("/api/items/{}", id)).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let fetched = read_json(fetched).await;
    assert_eq!(fetched["cost"], "4.50");
    assert_eq!(fetched["description"], "Double shot");
}

#[tokio::test]
async fn test_create_item_rejects_bad_money_and_empty_name() {
    let ctx = setup().await;
    create_user(&ctx.db, "owner@example.com", UserRole::Store).await;
    let token = login(&ctx.app, "owner@example.com").await;

    for cost in ["4.505", "abc", "-1.00", ""] {
        let response = post_json_auth(
            &ctx.app,
            "/api/items",
            &json!({ "name": "Flat White", "cost": cost }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "cost {:?}", cost);
    }

    let response = post_json_auth(
        &ctx.app,
        "/api/items",
        &json!({ "name": "   ", "cost": "4.50" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_item_uses_cookie_auth() {
    let ctx = setup().await;
    create_user(&ctx.db, "owner@example.com", UserRole::Store).await;
    let token = login(&ctx.app, "owner@example.com").await;
    let cookie = format!("access_token={}", token);

    let id = ctx
        .db
        .items()
        .create("Flat White", "", 450)
        .await
        .unwrap();

    // PUT extraction is cookie-only, so a bare request fails.
    let payload = json!({ "id": id, "name": "Oat Flat White", "cost": "5.00" });
    let response = put_json(&ctx.app, "/api/items", &payload).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = put_json_cookie(&ctx.app, "/api/items", &payload, &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = get(&ctx.app, &format!("/api/items/{}", id)).await;
    let fetched = read_json(fetched).await;
    assert_eq!(fetched["name"], "Oat Flat White");
    assert_eq!(fetched["cost"], "5.00");
}

#[tokio::test]
async fn test_update_unknown_item_is_not_found() {
    let ctx = setup().await;
    create_user(&ctx.db, "owner@example.com", UserRole::Store).await;
    let token = login(&ctx.app, "owner@example.com").await;
    let cookie = format!("access_token={}", token);

    let response = put_json_cookie(
        &ctx.app,
        "/api/items",
        &json!({ "id": "no-such-id", "name": "Ghost", "cost": "1.00" }),
        &cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_item() {
    let ctx = setup().await;
    create_user(&ctx.db, "owner@example.com", UserRole::Store).await;
    let token = login(&ctx.app, "owner@example.com").await;
    let cookie = format!("access_token={}", token);

    let id = ctx.db.items().create("Flat White", "", 450).await.unwrap();

    let response = delete_with_cookie(&ctx.app, &format!("/api/items/{}", id), &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    let gone = get(&ctx.app, &format!("/api/items/{}", id)).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let again = delete_with_cookie(&ctx.app, &format!("/api/items/{}", id), &cookie).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}
