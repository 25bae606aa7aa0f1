//! End-to-end tests for the session manager over both backends
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sessionkv::store::testing::{SimulatedFactory, SimulatedServer};
use sessionkv::store::{default_factory, SupervisorConfig};
use sessionkv::{
    BackendKind, HandlerRegistry, Missing, OptionalExt, RequestCookies, SessionConfig,
    SessionManager, SetCookie,
};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    roles: Vec<String>,
}

async fn network_manager(server: &SimulatedServer) -> SessionManager {
    let config = SessionConfig::builder()
        .save_path("tcp://127.0.0.1:6379")
        .gc_max_lifetime(60)
        .build()
        .unwrap();
    let registry = HandlerRegistry::with_factory(SimulatedFactory::new(
        server.clone(),
        SupervisorConfig::default(),
    ));
    SessionManager::from_registry(config, &registry).await.unwrap()
}

#[tokio::test]
async fn test_cookie_session_round_trip() {
    let server = SimulatedServer::new();
    let manager = network_manager(&server).await;

    // first request has no cookie
    let mut issued: Vec<SetCookie> = Vec::new();
    let session = manager.start(&RequestCookies::default(), &mut issued);
    assert!(session.is_new());
    assert_eq!(issued.len(), 1);
    session.set("user_id", &42u64).await.unwrap();

    // second request presents the issued cookie
    let header = format!("{}={}", issued[0].name, issued[0].value);
    let mut reissued: Vec<SetCookie> = Vec::new();
    let session = manager.start(&RequestCookies::parse(&header), &mut reissued);
    assert!(!session.is_new());
    assert!(reissued.is_empty());

    let user_id: u64 = session.get("user_id").await.unwrap();
    assert_eq!(user_id, 42);
    assert_eq!(server.ttl(session.id()), Some(Duration::from_secs(60)));
}

#[tokio::test]
async fn test_scenario_known_identifier() {
    let server = SimulatedServer::new();
    let manager = network_manager(&server).await;

    let session = manager.open("abc123");
    session.set("user_id", &42i32).await.unwrap();
    let user_id: i32 = session.get("user_id").await.unwrap();

    assert_eq!(user_id, 42);
    assert_eq!(server.ttl("abc123"), Some(Duration::from_secs(60)));
}

#[tokio::test]
async fn test_fresh_get_destroy_get() {
    let server = SimulatedServer::new();
    let manager = network_manager(&server).await;
    let session = manager.open("fresh");

    assert!(session.get::<String>("name").await.unwrap_err().is_not_found());

    session.set("name", "ada").await.unwrap();
    assert_eq!(session.get::<String>("name").await.unwrap(), "ada");

    session.destroy().await.unwrap();
    assert!(session.get::<String>("name").await.unwrap_err().is_not_found());
    assert_eq!(session.get::<String>("name").await.optional().unwrap(), None);
}

#[tokio::test]
async fn test_non_string_field_names_use_display_form() {
    let server = SimulatedServer::new();
    let manager = network_manager(&server).await;
    let session = manager.open("s");

    session.set(7, &true).await.unwrap();
    assert!(session.get::<bool>("7").await.unwrap());
    assert!(server.field("s", "7").is_some());

    session.del(7).await.unwrap();
    assert!(session.get::<bool>(7).await.is_err());
}

#[tokio::test]
async fn test_decoding_into_wrong_shape_fails() {
    let server = SimulatedServer::new();
    let manager = network_manager(&server).await;
    let session = manager.open("s");

    session.set("flag", &true).await.unwrap();
    let err = session.get::<Profile>("flag").await.unwrap_err();
    assert!(matches!(err, sessionkv::Error::Decoding { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_reconnects_are_observable() {
    let server = SimulatedServer::new();
    let manager = network_manager(&server).await;
    assert_eq!(manager.reconnects(), 0);

    server.fail_next_pings(10);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(manager.reconnects(), 1);
    manager.open("s").set("a", &1u8).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_requests_in_parallel() {
    let server = SimulatedServer::new();
    let manager = network_manager(&server).await;

    let requests = (0..64).map(|i| {
        let manager = manager.clone();
        tokio::spawn(async move {
            let mut issued: Vec<SetCookie> = Vec::new();
            let session = manager.start(&RequestCookies::default(), &mut issued);
            let profile = Profile {
                name: format!("user-{i}"),
                roles: vec!["reader".to_string()],
            };
            session.set("profile", &profile).await.unwrap();
            let stored: Profile = session.get("profile").await.unwrap();
            assert_eq!(stored, profile);
            session.id().clone()
        })
    });

    let mut ids: Vec<_> = join_all(requests)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();
    assert_eq!(ids.len(), 64);
}

#[tokio::test]
async fn test_embedded_backend_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = SessionConfig::builder()
        .save_path(format!("file://{}", dir.path().join("s.redb").display()))
        .build()
        .unwrap();
    let factory = default_factory(&config, SupervisorConfig::default()).unwrap();
    let manager = SessionManager::new(config, factory.as_ref()).await.unwrap();
    assert_eq!(manager.backend_kind(), BackendKind::Embedded);
    assert_eq!(manager.reconnects(), 0);

    let session = manager.open("abc123");
    let err = session.get::<u64>("user_id").await.unwrap_err();
    assert_eq!(err.missing(), Some(&Missing::Session));

    let profile = Profile {
        name: "ada".to_string(),
        roles: vec!["admin".to_string()],
    };
    session.set("profile", &profile).await.unwrap();
    assert_eq!(session.get::<Profile>("profile").await.unwrap(), profile);
    let err = session.get::<u64>("user_id").await.unwrap_err();
    assert_eq!(err.missing(), Some(&Missing::Field("user_id".to_string())));

    session.gc().await;
    session.destroy().await.unwrap();
    assert!(session.get::<Profile>("profile").await.unwrap_err().is_not_found());
    manager.health_check().await.unwrap();
    manager.close().await.unwrap();
}
