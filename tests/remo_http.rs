//! HTTP-level behaviour of the Nature Remo client against a mock server

mod integration;

use integration::mock_server::MockServerFixture;
use nature_remo_controller::{CommandOutcome, ControllerBuilder, Error, LightButton, RemoApi};
use std::time::SystemTime;

const DEVICES: &str = r#"[{
    "id": "d1",
    "name": "living",
    "newest_events": {
        "te": {"val": 23.1, "created_at": "2024-05-01T09:00:00Z"},
        "hu": {"val": 45, "created_at": "2024-05-01T09:00:00Z"}
    }
}]"#;

const APPLIANCES: &str = r#"[
    {"id": "a-tv", "nickname": "tv", "type": "IR",
     "signals": [{"id": "s-up", "name": "ch_up", "image": "ico_arrow_top"}]},
    {"id": "a-studio", "nickname": "studio", "type": "LIGHT", "signals": []}
]"#;

#[tokio::test]
async fn test_fetch_devices_records_rate_limit() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_get("/1/devices", 29, DEVICES).await;
    let api = fixture.api();

    assert_eq!(api.rate_limit().remaining, None);
    let devices = tokio_test::assert_ok!(api.fetch_devices().await);
    mock.assert_async().await;

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].readings().temperature, Some(23.1));
    assert_eq!(devices[0].readings().humidity, Some(45.0));

    let snapshot = api.rate_limit();
    assert_eq!(snapshot.limit, Some(30));
    assert_eq!(snapshot.remaining, Some(29));
    assert!(snapshot.reset_at.unwrap() > SystemTime::now());
}

#[tokio::test]
async fn test_send_signal_posts_to_signal_endpoint() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_post("/1/signals/s-up/send", None, 200, 28)
        .await;
    let api = fixture.api();

    tokio_test::assert_ok!(api.send_signal("s-up").await);
    mock.assert_async().await;
    assert_eq!(api.rate_limit().remaining, Some(28));
}

#[tokio::test]
async fn test_light_posts_button_form() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_post("/1/appliances/a-studio/light", Some(("button", "off")), 200, 27)
        .await;
    let api = fixture.api();

    tokio_test::assert_ok!(
        api.send_light_infrared_signal("a-studio", LightButton::Off)
            .await
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_error_status_still_records_rate_limit() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_post("/1/signals/s-up/send", None, 429, 0)
        .await;
    let api = fixture.api();

    let err = api.send_signal("s-up").await.unwrap_err();
    mock.assert_async().await;
    assert!(matches!(err, Error::Remote { status: 429, .. }));
    assert_eq!(err.status(), Some(429));
    assert_eq!(api.rate_limit().remaining, Some(0));
}

#[tokio::test]
async fn test_user_endpoint() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_get(
            "/1/users/me",
            25,
            r#"{"id": "u1", "nickname": "owner", "superuser": false}"#,
        )
        .await;
    let api = fixture.api();

    let user = tokio_test::assert_ok!(api.fetch_user().await);
    mock.assert_async().await;
    assert_eq!(user.nickname, "owner");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_controller_over_http() {
    let mut fixture = MockServerFixture::new().await;
    let devices = fixture.mock_get("/1/devices", 29, DEVICES).await;
    let appliances = fixture.mock_get("/1/appliances", 28, APPLIANCES).await;
    let light = fixture
        .mock_post("/1/appliances/a-studio/light", Some(("button", "on")), 200, 27)
        .await;

    let remo = ControllerBuilder::from_config(fixture.config())
        .build()
        .await
        .expect("controller builds");
    devices.assert_async().await;
    appliances.assert_async().await;
    assert_eq!(remo.appliances().len(), 2);
    assert_eq!(remo.remaining_count(), Some(28));

    let dispatch = remo.send_on_signal_light("studio").await;
    assert!(dispatch.is_admitted());
    let report = dispatch.handle().unwrap().wait().await;
    assert_eq!(report.label, "studio:on");
    assert_eq!(report.outcome, CommandOutcome::Sent);
    light.assert_async().await;

    // The send's response replaced the snapshot; usage is still counted.
    assert_eq!(remo.rate_limit().remaining, Some(27));
    assert_eq!(remo.remaining_count(), Some(26));
    assert!(remo.seconds_until_reset().unwrap() > 0);
}

#[tokio::test]
async fn test_build_without_token_fails() {
    let fixture = MockServerFixture::new().await;
    let mut config = fixture.config();
    config.token = None;
    std::env::remove_var("NATURE_REMO_TOKEN");

    // A keyring entry on the test machine would satisfy the lookup.
    if nature_remo_controller::transport::HttpTransport::resolve_token(None).is_some() {
        return;
    }
    let err = ControllerBuilder::from_config(config)
        .build()
        .await
        .err()
        .expect("missing token is an error");
    assert!(matches!(err, Error::Configuration { .. }));
}
