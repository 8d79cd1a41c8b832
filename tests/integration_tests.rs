#![cfg(feature = "server")]

mod common;

use std::sync::Arc;

use chaum_pedersen_auth::proto::auth_client::AuthClient;
use chaum_pedersen_auth::proto::auth_server::AuthServer;
use chaum_pedersen_auth::proto::{
    AuthenticationAnswerRequest, AuthenticationChallengeRequest, RegisterRequest,
};
use chaum_pedersen_auth::verifier::AuthServiceImpl;
use chaum_pedersen_auth::{ClientError, GroupParameters, ProverClient, VerifierEngine, Witness};
use num_bigint::BigUint;
use tonic::transport::Server;
use tonic::{Code, Request};

async fn start_test_server(params: GroupParameters) -> (String, VerifierEngine) {
    let engine = VerifierEngine::new(Arc::new(params));
    let service = AuthServiceImpl::new(engine.clone());

    let addr: std::net::SocketAddr = "127.0.0.1:0".parse().unwrap();
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let local_addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        Server::builder()
            .add_service(AuthServer::new(service))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    (format!("http://{local_addr}"), engine)
}

#[tokio::test]
async fn full_authentication_flow() {
    common::init_tracing();
    let (server_url, engine) = start_test_server(GroupParameters::toy()).await;

    let witness = Witness::new(&BigUint::from(6u32));
    let mut client = ProverClient::connect(server_url, GroupParameters::toy(), witness)
        .await
        .expect("Failed to connect to server");

    client.register("alice").await.expect("Registration should succeed");
    let session_id = client.login("alice").await.expect("Login should succeed");

    assert_eq!(session_id.len(), 64);
    let session = engine.session(&session_id).await.expect("session recorded");
    assert_eq!(session.user_id, "alice");
}

#[tokio::test]
async fn repeated_logins_get_distinct_sessions() {
    common::init_tracing();
    let (server_url, _engine) = start_test_server(GroupParameters::rfc5114()).await;

    let x = BigUint::parse_bytes(b"31415926535897932384626433832795028841971", 10).unwrap();
    let mut client = ProverClient::connect(server_url, GroupParameters::rfc5114(), Witness::new(&x))
        .await
        .unwrap();

    client.register("carol.smith@example.org").await.unwrap();
    let first = client.login("carol.smith@example.org").await.unwrap();
    let second = client.login("carol.smith@example.org").await.unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn wrong_secret_is_unauthenticated() {
    common::init_tracing();
    let (server_url, _engine) = start_test_server(GroupParameters::demo256()).await;

    let mut owner = ProverClient::connect(
        server_url.clone(),
        GroupParameters::demo256(),
        Witness::new(&BigUint::from(1111u32)),
    )
    .await
    .unwrap();
    owner.register("dave").await.unwrap();

    let mut impostor = ProverClient::connect(
        server_url,
        GroupParameters::demo256(),
        Witness::new(&BigUint::from(2222u32)),
    )
    .await
    .unwrap();

    match impostor.login("dave").await {
        Err(ClientError::Rpc(status)) => {
            assert_eq!(status.code(), Code::Unauthenticated);
            assert_eq!(status.message(), "authentication failed");
        }
        other => panic!("expected unauthenticated, got {other:?}"),
    }
}

#[tokio::test]
async fn status_codes_over_the_wire() {
    common::init_tracing();
    let (server_url, _engine) = start_test_server(GroupParameters::toy()).await;
    let mut client = AuthClient::connect(server_url).await.unwrap();

    let register = |user: &str, y1: &str, y2: &str| {
        Request::new(RegisterRequest {
            user: user.to_string(),
            y1: y1.to_string(),
            y2: y2.to_string(),
        })
    };

    client.register(register("alice", "2", "3")).await.unwrap();

    let status = client.register(register("alice", "2", "3")).await.unwrap_err();
    assert_eq!(status.code(), Code::AlreadyExists);

    let status = client.register(register("bob", "2 ", "3")).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client.register(register("bob", "5", "3")).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client.register(register("bob smith", "2", "3")).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client
        .create_authentication_challenge(Request::new(AuthenticationChallengeRequest {
            user: "mallory".to_string(),
            r1: "8".to_string(),
            r2: "4".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    let status = client
        .verify_authentication(Request::new(AuthenticationAnswerRequest {
            auth_id: "00".repeat(32),
            s: "5".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    for _ in 0..3 {
        client
            .create_authentication_challenge(Request::new(AuthenticationChallengeRequest {
                user: "alice".to_string(),
                r1: "8".to_string(),
                r2: "4".to_string(),
            }))
            .await
            .unwrap();
    }
    let status = client
        .create_authentication_challenge(Request::new(AuthenticationChallengeRequest {
            user: "alice".to_string(),
            r1: "8".to_string(),
            r2: "4".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::ResourceExhausted);
}
