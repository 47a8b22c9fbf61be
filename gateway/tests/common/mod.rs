#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use auth::HashParams;
use auth::SigningSecret;
use auth::TokenService;
use gateway::create_router;
use gateway::RpcIdentityClient;
use identity_service::domain::auth::models::AdminBootstrap;
use identity_service::domain::auth::models::RegisterCommand;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::NewPassword;
use identity_service::domain::user::models::Username;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::rpc::IdentityDispatcher;
use identity_service::outbound::hashing::Argon2CredentialHasher;
use identity_service::outbound::repositories::InMemoryUserRepository;
use rpc::ClientConfig;
use rpc::RpcServer;
use serde_json::Value;

pub const TEST_SECRET: &str = "test-signing-key-9f8e7d6c5b4a3210";
pub const ADMIN_EMAIL: &str = "root@x.com";

/// Gateway wired to a real identity service over the RPC transport
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub tokens: Arc<TokenService>,
    pub admin_id: String,
    pub admin_token: String,
}

fn token_service() -> Arc<TokenService> {
    let secret = SigningSecret::new(TEST_SECRET).expect("Test secret rejected");
    Arc::new(TokenService::new(&secret, chrono::Duration::hours(1)))
}

/// Serve the gateway on a random port, talking to `identity_address`
async fn spawn_gateway(identity_address: String, tokens: Arc<TokenService>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let identity = Arc::new(RpcIdentityClient::new(
        ClientConfig::new(identity_address)
            .with_request_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_millis(500)),
    ));
    let application = create_router(identity, tokens);

    tokio::spawn(async move {
        axum::serve(listener, application)
            .await
            .expect("Server error");
    });

    format!("http://127.0.0.1:{}", port)
}

impl TestApp {
    /// Spawn an identity service and a gateway in background tasks
    pub async fn spawn() -> Self {
        let tokens = token_service();

        let repository = Arc::new(InMemoryUserRepository::new());
        // Cheap Argon2 parameters keep the suite fast.
        let hasher = Arc::new(Argon2CredentialHasher::with_params(
            HashParams::new(8, 1, 1, None).unwrap(),
        ));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&repository),
            Arc::clone(&hasher),
            Arc::clone(&tokens),
        ));
        let user_service = Arc::new(UserService::new(repository, hasher));

        let admin = match auth_service
            .bootstrap_admin(RegisterCommand::new(
                Username::new("root".to_string()).unwrap(),
                EmailAddress::new(ADMIN_EMAIL.to_string()).unwrap(),
                NewPassword::new("Admin123!".to_string()).unwrap(),
            ))
            .await
            .expect("Failed to bootstrap admin")
        {
            AdminBootstrap::Created(user) | AdminBootstrap::AlreadyPresent(user) => user,
        };
        let admin_token = tokens.issue(&admin.identity()).unwrap();

        let identity_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let identity_address = identity_listener.local_addr().unwrap().to_string();
        let dispatcher = Arc::new(IdentityDispatcher::new(auth_service, user_service));
        tokio::spawn(async move {
            RpcServer::new(dispatcher)
                .serve(identity_listener)
                .await
                .expect("Server error");
        });

        let address = spawn_gateway(identity_address, Arc::clone(&tokens)).await;

        TestApp {
            address,
            api_client: reqwest::Client::new(),
            tokens,
            admin_id: admin.id.to_string(),
            admin_token,
        }
    }

    /// Spawn a gateway whose identity service address has nothing listening
    pub async fn spawn_without_identity_service() -> Self {
        let tokens = token_service();

        let unused = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let identity_address = unused.local_addr().unwrap().to_string();
        drop(unused);

        let address = spawn_gateway(identity_address, Arc::clone(&tokens)).await;

        TestApp {
            address,
            api_client: reqwest::Client::new(),
            tokens,
            admin_id: String::new(),
            admin_token: String::new(),
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_authenticated(&self, path: &str, token: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn patch_authenticated(
        &self,
        path: &str,
        token: &str,
        body: &Value,
    ) -> reqwest::Response {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::Response {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register through the gateway and return `(user id, token)`
    pub async fn register(&self, email: &str, username: &str) -> (String, String) {
        let response = self
            .post(
                "/auth/register",
                &serde_json::json!({
                    "email": email,
                    "username": username,
                    "password": "Secret123!",
                }),
            )
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.unwrap();
        let id = body["data"]["user"]["id"].as_str().unwrap().to_string();
        let token = body["data"]["token"].as_str().unwrap().to_string();
        (id, token)
    }
}
