// End-to-end ceremonies: the real router on an ephemeral port, driven by
// the HTTP relying party client and the software authenticator.

use passkey_ceremony::app::build_router;
use passkey_ceremony::client::{
    CeremonyController, CeremonyError, HttpRelyingParty, SoftAuthenticator, StatusLine, Verdict,
};
use passkey_ceremony::config::Config;
use passkey_ceremony::db::challenges::{self, ChallengeKind};
use passkey_ceremony::db::users;
use passkey_ceremony::error::AppError;
use passkey_ceremony::state::AppState;
use reqwest::StatusCode;
use sqlx::SqlitePool;
use tempfile::TempDir;

struct TestServer {
    base_url: String,
    origin: String,
    db: SqlitePool,
    // Keeps the database file alive for the duration of the test
    _dir: TempDir,
}

async fn start_server() -> TestServer {
    let dir = tempfile::tempdir().expect("temp dir");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let port = listener.local_addr().unwrap().port();

    let db_path = dir.path().join("passkeys.db");
    let database_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let origin = format!("http://localhost:{port}");

    let config = Config::from_lookup(|key| match key {
        "PORT" => Some(port.to_string()),
        "DATABASE_URL" => Some(database_url.clone()),
        "RP_ORIGIN" => Some(origin.clone()),
        "STATIC_DIR" => Some(dir.path().display().to_string()),
        _ => None,
    })
    .expect("config");

    let state = AppState::new(&config).await.expect("state");
    let db = state.db.clone();
    let app = build_router(state, &config).await.expect("router");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestServer {
        base_url: format!("http://127.0.0.1:{port}"),
        origin,
        db,
        _dir: dir,
    }
}

fn controller(
    server: &TestServer,
) -> CeremonyController<HttpRelyingParty, SoftAuthenticator, StatusLine> {
    CeremonyController::mount(
        HttpRelyingParty::new(&server.base_url).unwrap(),
        SoftAuthenticator::new(&server.origin, 60_000).unwrap(),
        StatusLine::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn register_then_authenticate() {
    let server = start_server().await;
    let controller = controller(&server);

    let registration = controller.register("alice").await.expect("registration");
    assert_eq!(registration, Verdict::Verified);
    assert_eq!(
        controller.announcer().current().as_deref(),
        Some("Success! Now try to authenticate...")
    );

    let authentication = controller.authenticate("alice").await.expect("authentication");
    assert_eq!(authentication, Verdict::Verified);
    assert_eq!(
        controller.announcer().current().as_deref(),
        Some("Success! You're authenticated")
    );
}

#[tokio::test]
async fn authenticating_unknown_user_fails_at_options() {
    let server = start_server().await;
    let controller = controller(&server);

    let err = controller.authenticate("mallory").await.unwrap_err();

    assert!(matches!(err, CeremonyError::Status(StatusCode::NOT_FOUND)));
    assert!(controller
        .announcer()
        .current()
        .unwrap()
        .starts_with("Error: "));
}

#[tokio::test]
async fn wrong_origin_is_rejected_by_verification() {
    let server = start_server().await;

    let impostor = CeremonyController::mount(
        HttpRelyingParty::new(&server.base_url).unwrap(),
        SoftAuthenticator::new("http://localhost:1", 60_000).unwrap(),
        StatusLine::new(),
    )
    .unwrap();

    let verdict = impostor.register("alice").await.expect("completes");
    assert_eq!(verdict, Verdict::Rejected(StatusCode::BAD_REQUEST));
    assert_eq!(
        impostor.announcer().current().as_deref(),
        Some("Registration failed")
    );

    // The rejected attempt used up its challenge
    let alice = users::find_by_username(&server.db, "alice").await.unwrap();
    assert!(matches!(
        challenges::latest(&server.db, ChallengeKind::Registration, &alice.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn stranger_cannot_add_passkey_to_enrolled_account() {
    let server = start_server().await;

    let alice = controller(&server);
    assert_eq!(alice.register("alice").await.unwrap(), Verdict::Verified);

    let mallory = controller(&server);
    let err = mallory.register("alice").await.unwrap_err();
    assert!(matches!(err, CeremonyError::Status(StatusCode::UNAUTHORIZED)));
    assert!(mallory
        .announcer()
        .current()
        .unwrap()
        .starts_with("Error: "));
}

#[tokio::test]
async fn signed_in_user_can_add_another_device() {
    let server = start_server().await;
    // Both devices share one browser session
    let http = reqwest::Client::builder().cookie_store(true).build().unwrap();
    let device = |http: &reqwest::Client| {
        CeremonyController::mount(
            HttpRelyingParty::with_client(http.clone(), &server.base_url).unwrap(),
            SoftAuthenticator::new(&server.origin, 60_000).unwrap(),
            StatusLine::new(),
        )
        .unwrap()
    };

    let phone = device(&http);
    assert_eq!(phone.register("alice").await.unwrap(), Verdict::Verified);
    assert_eq!(phone.authenticate("alice").await.unwrap(), Verdict::Verified);

    let laptop = device(&http);
    assert_eq!(laptop.register("alice").await.unwrap(), Verdict::Verified);
}
