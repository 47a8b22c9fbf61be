mod common;

use auth::Role;
use common::TestApp;
use protocol::DeleteUserRequest;
use protocol::FindAllUsersRequest;
use protocol::FindUserByIdRequest;
use protocol::GetUserCountByRoleRequest;
use protocol::GetUserCountRequest;
use protocol::LoginRequest;
use protocol::Password;
use protocol::RegisterRequest;
use protocol::UpdateUserPasswordRequest;
use protocol::UpdateUserRequest;
use protocol::ValidateUserRequest;
use rpc::ErrorKind;
use rpc::RemoteError;
use rpc::RpcError;
use serde_json::json;

fn register_request(email: &str, username: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        username: username.to_string(),
        password: Password::new("Secret123!"),
    }
}

fn remote(error: RpcError) -> RemoteError {
    match error {
        RpcError::Remote(remote) => remote,
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_returns_token_and_user_without_digest() {
    let app = TestApp::spawn().await;

    let value = app
        .client
        .send(
            "register",
            json!({ "email": "a@x.com", "username": "alice", "password": "Secret123!" }),
        )
        .await
        .expect("register failed");

    assert_eq!(value["user"]["email"], "a@x.com");
    assert_eq!(value["user"]["roles"], json!(["USER"]));
    assert!(value["user"].get("password").is_none());
    assert!(value["user"].get("passwordHash").is_none());
    assert!(!value.to_string().contains("$argon2"));

    let identity = app
        .tokens
        .verify(value["token"].as_str().unwrap())
        .expect("issued token does not verify");
    assert_eq!(identity.email, "a@x.com");
    assert_eq!(identity.username, "alice");
    assert_eq!(identity.user_id, value["user"]["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_duplicate_email_and_username_conflict() {
    let app = TestApp::spawn().await;
    app.client
        .call(&register_request("a@x.com", "alice"))
        .await
        .unwrap();

    let email_taken = remote(
        app.client
            .call(&register_request("a@x.com", "bob"))
            .await
            .unwrap_err(),
    );
    let username_taken = remote(
        app.client
            .call(&register_request("b@x.com", "alice"))
            .await
            .unwrap_err(),
    );

    assert_eq!(email_taken.status_code, 409);
    assert_eq!(email_taken.error_kind, ErrorKind::Conflict);
    assert!(email_taken.message.contains("Email already in use"));
    assert_eq!(username_taken.status_code, 409);
    assert!(username_taken.message.contains("Username already in use"));
}

#[tokio::test]
async fn test_concurrent_duplicate_registration_has_single_winner() {
    let app = std::sync::Arc::new(TestApp::spawn().await);

    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let app = std::sync::Arc::clone(&app);
            tokio::spawn(async move {
                app.client
                    .call(&register_request("race@x.com", &format!("racer{}", i)))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(_) => successes += 1,
            Err(error) => assert_eq!(remote(error).status_code, 409),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(app.client.call(&GetUserCountRequest {}).await.unwrap(), 1);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.client
        .call(&register_request("a@x.com", "alice"))
        .await
        .unwrap();

    let wrong_password = remote(
        app.client
            .call(&LoginRequest {
                email: "a@x.com".to_string(),
                password: Password::new("WrongPass"),
            })
            .await
            .unwrap_err(),
    );
    let unknown_email = remote(
        app.client
            .call(&LoginRequest {
                email: "nobody@x.com".to_string(),
                password: Password::new("Secret123!"),
            })
            .await
            .unwrap_err(),
    );

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.status_code, 401);
    assert_eq!(wrong_password.message, "Invalid credentials");
}

#[tokio::test]
async fn test_validate_user_is_idempotent() {
    let app = TestApp::spawn().await;
    app.client
        .call(&register_request("a@x.com", "alice"))
        .await
        .unwrap();

    let request = ValidateUserRequest {
        email: "a@x.com".to_string(),
        password: Password::new("Secret123!"),
    };
    let first = app.client.call(&request).await.unwrap();
    let second = app.client.call(&request).await.unwrap();

    assert_eq!(first.user, second.user);

    let camel = app
        .client
        .send(
            "validateUser",
            json!({ "email": "a@x.com", "password": "Secret123!" }),
        )
        .await
        .unwrap();
    assert_eq!(camel["user"]["id"], json!(first.user.id));
}

#[tokio::test]
async fn test_user_management_round() {
    let app = TestApp::spawn().await;
    let registered = app
        .client
        .call(&register_request("a@x.com", "alice"))
        .await
        .unwrap();
    let id = registered.user.id.clone();

    let found = app
        .client
        .call(&FindUserByIdRequest { id: id.clone() })
        .await
        .unwrap();
    assert_eq!(found, registered.user);

    let updated = app
        .client
        .call(&UpdateUserRequest {
            id: id.clone(),
            username: Some("alice2".to_string()),
            email: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.username, "alice2");
    assert_eq!(updated.email, "a@x.com");
    assert!(updated.updated_at >= updated.created_at);

    app.client
        .call(&UpdateUserPasswordRequest {
            id: id.clone(),
            new_password: Password::new("NewSecret1!"),
        })
        .await
        .unwrap();
    let relogin = app
        .client
        .call(&LoginRequest {
            email: "a@x.com".to_string(),
            password: Password::new("NewSecret1!"),
        })
        .await
        .unwrap();
    assert_eq!(relogin.user.id, id);

    let all = app.client.call(&FindAllUsersRequest {}).await.unwrap();
    assert_eq!(all.len(), 1);

    let deleted = app
        .client
        .call(&DeleteUserRequest { id: id.clone() })
        .await
        .unwrap();
    assert_eq!(deleted.message, "User deleted successfully");

    let gone = remote(
        app.client
            .call(&FindUserByIdRequest { id })
            .await
            .unwrap_err(),
    );
    assert_eq!(gone.status_code, 404);
}

#[tokio::test]
async fn test_update_user_to_taken_email_conflicts() {
    let app = TestApp::spawn().await;
    let alice = app
        .client
        .call(&register_request("a@x.com", "alice"))
        .await
        .unwrap();
    app.client
        .call(&register_request("b@x.com", "bob"))
        .await
        .unwrap();

    let error = remote(
        app.client
            .call(&UpdateUserRequest {
                id: alice.user.id,
                username: None,
                email: Some("b@x.com".to_string()),
            })
            .await
            .unwrap_err(),
    );

    assert_eq!(error.status_code, 409);
}

#[tokio::test]
async fn test_counts() {
    let app = TestApp::spawn().await;
    app.client
        .call(&register_request("a@x.com", "alice"))
        .await
        .unwrap();
    app.client
        .call(&register_request("b@x.com", "bob"))
        .await
        .unwrap();

    let total = app.client.call(&GetUserCountRequest {}).await.unwrap();
    let admins = app
        .client
        .call(&GetUserCountByRoleRequest { role: Role::Admin })
        .await
        .unwrap();
    let users = app
        .client
        .call(&GetUserCountByRoleRequest { role: Role::User })
        .await
        .unwrap();

    assert_eq!(total, 2);
    assert_eq!(admins, 0);
    assert_eq!(users, 2);
}

#[tokio::test]
async fn test_invalid_inputs_are_validation_errors() {
    let app = TestApp::spawn().await;

    let bad_id = remote(
        app.client
            .call(&FindUserByIdRequest {
                id: "42".to_string(),
            })
            .await
            .unwrap_err(),
    );
    let bad_email = remote(
        app.client
            .call(&register_request("not-an-email", "alice"))
            .await
            .unwrap_err(),
    );
    let bad_payload = remote(
        app.client
            .send("register", json!({ "email": "a@x.com" }))
            .await
            .unwrap_err(),
    );

    for error in [bad_id, bad_email, bad_payload] {
        assert_eq!(error.status_code, 400);
        assert_eq!(error.error_kind, ErrorKind::ValidationError);
    }
}
