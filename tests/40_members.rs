mod common;

use anyhow::Result;
use common::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

use gymdesk_api::auth::Role;

async fn trainer_token(server: &TestServer) -> Result<String> {
    server.create_trainer("coach@gym.test", "lift-heavy", true).await?;
    let res = server
        .client
        .post(server.url("/api/trainers/auth"))
        .json(&json!({ "email": "coach@gym.test", "password": "lift-heavy" }))
        .send()
        .await?;
    let body: Value = res.json().await?;
    Ok(body["token"].as_str().expect("token").to_string())
}

#[tokio::test]
async fn trainer_member_changes_reach_the_admin_feed() -> Result<()> {
    let server = TestServer::start().await?;
    let trainer = trainer_token(&server).await?;
    let admin = server.token(Role::SuperAdmin);

    let created = server
        .client
        .post(server.url("/api/trainers/members"))
        .bearer_auth(&trainer)
        .json(&json!({
            "name": "Ravi",
            "email": "ravi@gym.test",
            "membershipType": "Monthly",
            "startDate": "2024-06-01",
            "endDate": "2024-07-01",
            "amountPaid": 1500.0
        }))
        .send()
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let member: Value = created.json().await?;
    let id = member["id"].as_str().expect("member id").to_string();
    assert_eq!(member["amountPaid"], json!(1500.0));

    let updated = server
        .client
        .put(server.url(&format!("/api/trainers/members?id={}", id)))
        .bearer_auth(&trainer)
        .json(&json!({ "phone": "98450 00000" }))
        .send()
        .await?;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated: Value = updated.json().await?;
    assert_eq!(updated["phone"], "98450 00000");
    assert_eq!(updated["name"], "Ravi");

    let deleted = server
        .client
        .delete(server.url(&format!("/api/trainers/members?id={}", id)))
        .bearer_auth(&trainer)
        .send()
        .await?;
    assert_eq!(deleted.status(), StatusCode::OK);

    let feed: Vec<Value> = server
        .client
        .get(server.url("/api/admin/notifications"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(feed.len(), 3);
    let mut kinds: Vec<&str> = feed.iter().filter_map(|n| n["type"].as_str()).collect();
    kinds.sort_unstable();
    assert_eq!(kinds, ["member_added", "member_deleted", "member_updated"]);
    assert!(feed
        .iter()
        .any(|n| n["message"] == "Coach Mira added a new member: Ravi"));
    assert!(feed.iter().all(|n| n["isRead"] == false));

    let first = feed[0]["id"].as_str().expect("notification id").to_string();
    let marked = server
        .client
        .patch(server.url("/api/admin/notifications"))
        .bearer_auth(&admin)
        .json(&json!({ "id": first }))
        .send()
        .await?;
    assert_eq!(marked.status(), StatusCode::OK);
    let marked: Value = marked.json().await?;
    assert_eq!(marked["isRead"], true);

    let stats: Value = server
        .client
        .get(server.url("/api/admin/stats"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(stats["unreadNotifications"], 2);
    assert_eq!(stats["totalTrainers"], 1);
    assert_eq!(stats["totalMembers"], 0);

    let removed = server
        .client
        .delete(server.url(&format!("/api/admin/notifications?id={}", first)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(removed.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn trainer_member_routes_check_role_and_ids() -> Result<()> {
    let server = TestServer::start().await?;
    let trainer = trainer_token(&server).await?;

    let anonymous = server.client.get(server.url("/api/trainers/members")).send().await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let as_admin = server
        .client
        .get(server.url("/api/trainers/members"))
        .bearer_auth(server.token(Role::SuperAdmin))
        .send()
        .await?;
    assert_eq!(as_admin.status(), StatusCode::FORBIDDEN);

    let no_id = server
        .client
        .delete(server.url("/api/trainers/members"))
        .bearer_auth(&trainer)
        .send()
        .await?;
    assert_eq!(no_id.status(), StatusCode::BAD_REQUEST);

    let unknown = server
        .client
        .delete(server.url(&format!(
            "/api/trainers/members?id={}",
            "00000000-0000-0000-0000-000000000000"
        )))
        .bearer_auth(&trainer)
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    let body: Value = unknown.json().await?;
    assert_eq!(body["error"], "Member not found");
    Ok(())
}

#[tokio::test]
async fn admin_manages_members_and_trainers() -> Result<()> {
    let server = TestServer::start().await?;
    let admin = server.token(Role::SuperAdmin);

    let created = server
        .client
        .post(server.url("/api/admin/members"))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Leela",
            "email": "leela@gym.test",
            "membershipType": "Quarterly",
            "startDate": "2024-06-05"
        }))
        .send()
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let member: Value = created.json().await?;
    let id = member["id"].as_str().expect("member id").to_string();

    let shown = server
        .client
        .get(server.url(&format!("/api/admin/members/{}", id)))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(shown.status(), StatusCode::OK);

    let bad_id = server
        .client
        .get(server.url("/api/admin/members/not-a-uuid"))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);

    // Admin edits never produce notifications
    let feed: Vec<Value> = server
        .client
        .get(server.url("/api/admin/notifications"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert!(feed.is_empty());

    let trainer = server
        .client
        .post(server.url("/api/admin/trainers"))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Coach Arjun",
            "email": "arjun@gym.test",
            "password": "deadlift",
            "specialization": "Powerlifting"
        }))
        .send()
        .await?;
    assert_eq!(trainer.status(), StatusCode::CREATED);
    let trainer: Value = trainer.json().await?;
    assert_eq!(trainer["isActive"], true);
    assert!(trainer.get("passwordHash").is_none());

    let duplicate = server
        .client
        .post(server.url("/api/admin/trainers"))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Other", "email": "arjun@gym.test", "password": "x" }))
        .send()
        .await?;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let trainer_id = trainer["id"].as_str().expect("trainer id");
    let deactivated = server
        .client
        .put(server.url(&format!("/api/admin/trainers/{}", trainer_id)))
        .bearer_auth(&admin)
        .json(&json!({ "isActive": false }))
        .send()
        .await?;
    assert_eq!(deactivated.status(), StatusCode::OK);

    let login = server
        .client
        .post(server.url("/api/trainers/auth"))
        .json(&json!({ "email": "arjun@gym.test", "password": "deadlift" }))
        .send()
        .await?;
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn member_updates_are_validated_like_creates() -> Result<()> {
    let server = TestServer::start().await?;
    let admin = server.token(Role::SuperAdmin);
    let trainer = trainer_token(&server).await?;

    let created: Value = server
        .client
        .post(server.url("/api/admin/members"))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Kiran",
            "email": "kiran@gym.test",
            "membershipType": "Monthly",
            "startDate": "2024-06-01",
            "endDate": "2024-07-01",
            "amountPaid": 1200.0
        }))
        .send()
        .await?
        .json()
        .await?;
    let id = created["id"].as_str().expect("member id").to_string();

    let corrupting = json!({ "name": "  ", "endDate": "2024-01-01", "amountPaid": -500 });
    let admin_put = server
        .client
        .put(server.url(&format!("/api/admin/members/{}", id)))
        .bearer_auth(&admin)
        .json(&corrupting)
        .send()
        .await?;
    assert_eq!(admin_put.status(), StatusCode::BAD_REQUEST);

    let early_end = server
        .client
        .put(server.url(&format!("/api/trainers/members?id={}", id)))
        .bearer_auth(&trainer)
        .json(&json!({ "endDate": "2024-05-01" }))
        .send()
        .await?;
    assert_eq!(early_end.status(), StatusCode::BAD_REQUEST);
    let body: Value = early_end.json().await?;
    assert_eq!(body["error"], "End date cannot be before start date");

    let refund = server
        .client
        .put(server.url(&format!("/api/trainers/members?id={}", id)))
        .bearer_auth(&trainer)
        .json(&json!({ "amountPaid": -1.0 }))
        .send()
        .await?;
    assert_eq!(refund.status(), StatusCode::BAD_REQUEST);

    let stored: Value = server
        .client
        .get(server.url(&format!("/api/admin/members/{}", id)))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(stored["name"], "Kiran");
    assert_eq!(stored["endDate"], "2024-07-01");
    assert_eq!(stored["amountPaid"], json!(1200.0));

    // Rejected trainer edits leave no trace in the admin feed
    let feed: Vec<Value> = server
        .client
        .get(server.url("/api/admin/notifications"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert!(feed.is_empty());

    let renewed = server
        .client
        .put(server.url(&format!("/api/admin/members/{}", id)))
        .bearer_auth(&admin)
        .json(&json!({ "endDate": "2024-08-01" }))
        .send()
        .await?;
    assert_eq!(renewed.status(), StatusCode::OK);

    let unknown = server
        .client
        .put(server.url(&format!(
            "/api/admin/members/{}",
            "00000000-0000-0000-0000-000000000000"
        )))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    Ok(())
}
