use std::sync::Arc;
use std::time::Duration;

use auth::HashParams;
use auth::SigningSecret;
use auth::TokenService;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::rpc::IdentityDispatcher;
use identity_service::outbound::hashing::Argon2CredentialHasher;
use identity_service::outbound::repositories::InMemoryUserRepository;
use rpc::ClientConfig;
use rpc::RpcClient;
use rpc::RpcServer;

pub const TEST_SECRET: &str = "test-signing-key-9f8e7d6c5b4a3210";

/// Test application that spawns a real identity RPC server backed by the in-memory store
pub struct TestApp {
    pub client: RpcClient,
    pub tokens: Arc<TokenService>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = listener.local_addr().unwrap().to_string();

        let secret = SigningSecret::new(TEST_SECRET).expect("Test secret rejected");
        let tokens = Arc::new(TokenService::new(&secret, chrono::Duration::hours(1)));

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
        let dispatcher = Arc::new(IdentityDispatcher::new(auth_service, user_service));

        tokio::spawn(async move {
            RpcServer::new(dispatcher)
                .serve(listener)
                .await
                .expect("Server error");
        });

        let client = RpcClient::new(
            ClientConfig::new(&address).with_request_timeout(Duration::from_secs(5)),
        );

        TestApp {
            client,
            tokens,
        }
    }
}
