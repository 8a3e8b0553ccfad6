//! Resource services against the in-process backend.
//!
//! Every mutation is followed by a fresh read: the client keeps no cache, so
//! what the next call returns is exactly what the backend stored.

use eventhub_admin::api::{ApiClient, ApiError, NETWORK_ERROR_DETAIL};
use eventhub_admin::config::ApiConfig;
use eventhub_admin::services::{ImageFile, RegistrationFilter, TeambuildingFilter};
use eventhub_core::{RegistrationStatus, TeambuildingInput, TeambuildingStatus};
use eventhub_integration_tests::{
    ADMIN_EMAIL, ADMIN_NAME, ADMIN_TOKEN, FakeBackend, VIEWER_TOKEN, date, noon,
};

fn retreat() -> TeambuildingInput {
    TeambuildingInput {
        name: "Ardennes Retreat".to_string(),
        description: Some("Two days of hiking".to_string()),
        location: Some("Durbuy".to_string()),
        start_date: date(2030, 9, 10),
        end_date: date(2030, 9, 11),
        budget: Some("2500.00".parse().expect("valid decimal")),
        image_url: None,
        status: TeambuildingStatus::Active,
    }
}

#[tokio::test]
async fn teambuilding_changes_are_visible_on_the_next_read() {
    let backend = FakeBackend::start().await;
    let api = backend.session(ADMIN_TOKEN);
    let service = api.teambuildings();

    let created = service.create(&retreat()).await.expect("create");
    let listed = service
        .list(&TeambuildingFilter::default())
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Ardennes Retreat");

    let mut input = TeambuildingInput::from(&created);
    input.name = "Ardennes Weekend".to_string();
    input.status = TeambuildingStatus::Inactive;
    service.update(created.id, &input).await.expect("update");

    let fetched = service.get(created.id).await.expect("get");
    assert_eq!(fetched.name, "Ardennes Weekend");
    assert!(service.active().await.expect("active").is_empty());

    service.delete(created.id).await.expect("delete");
    let listed = service
        .list(&TeambuildingFilter::default())
        .await
        .expect("list after delete");
    assert!(listed.is_empty());
}

#[tokio::test]
async fn status_filter_is_applied_by_the_backend() {
    let backend = FakeBackend::start().await;
    let api = backend.session(ADMIN_TOKEN);
    backend.seed_teambuilding("Active one");
    let mut inactive = retreat();
    inactive.status = TeambuildingStatus::Inactive;
    api.teambuildings().create(&inactive).await.expect("create");

    let filter = TeambuildingFilter {
        status: Some(TeambuildingStatus::Inactive),
        ..TeambuildingFilter::default()
    };
    let listed = api.teambuildings().list(&filter).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, TeambuildingStatus::Inactive);
}

#[tokio::test]
async fn rejected_token_is_session_expired() {
    let backend = FakeBackend::start().await;
    let err = backend
        .session("not-a-token")
        .teambuildings()
        .active()
        .await
        .expect_err("401 expected");
    assert!(err.is_session_expired());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn revoked_token_turns_into_session_expired() {
    let backend = FakeBackend::start().await;
    let api = backend.session(ADMIN_TOKEN);
    api.dashboard().stats().await.expect("stats before revocation");

    backend.revoke_tokens();
    let err = api.dashboard().stats().await.expect_err("401 expected");
    assert!(matches!(err, ApiError::SessionExpired));
}

#[tokio::test]
async fn forbidden_keeps_the_backend_detail() {
    let backend = FakeBackend::start().await;
    let api = backend.session(VIEWER_TOKEN);

    assert!(api.teambuildings().active().await.is_ok());

    let err = api
        .teambuildings()
        .create(&retreat())
        .await
        .expect_err("403 expected");
    match err {
        ApiError::Forbidden { detail } => assert_eq!(detail, "Admin privileges required"),
        other => panic!("expected Forbidden, got {other:?}"),
    }
    assert_eq!(backend.teambuilding_count(), 0);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let config = ApiConfig::new(&format!("http://{addr}/api")).expect("config");
    let api = ApiClient::new(&config).expect("client").session(None);

    let err = api.events().upcoming(5).await.expect_err("no server");
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.detail(), NETWORK_ERROR_DETAIL);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn validation_errors_carry_the_backend_detail() {
    let backend = FakeBackend::start().await;
    let mut input = retreat();
    input.name = "   ".to_string();

    let err = backend
        .session(ADMIN_TOKEN)
        .teambuildings()
        .create(&input)
        .await
        .expect_err("422 expected");
    match err {
        ApiError::Rejected { status, detail } => {
            assert_eq!(status, 422);
            assert_eq!(detail, "Name is required");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn deleting_a_teambuilding_with_events_is_refused_by_the_backend() {
    let backend = FakeBackend::start().await;
    let tb = backend.seed_teambuilding("Kayak day");
    backend.seed_event(tb, "Morning paddle", noon(2030, 6, 1), 12);

    let err = backend
        .session(ADMIN_TOKEN)
        .teambuildings()
        .delete(tb)
        .await
        .expect_err("400 expected");
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.detail(),
        "Cannot delete teambuilding with existing events"
    );
    assert_eq!(backend.teambuilding_count(), 1);
}

#[tokio::test]
async fn repeating_a_status_update_is_a_no_op() {
    let backend = FakeBackend::start().await;
    let tb = backend.seed_teambuilding("Cooking class");
    let event = backend.seed_event(tb, "Pasta night", noon(2030, 6, 2), 10);
    let reg = backend.seed_registration(event, "sam@eventhub.test", RegistrationStatus::Pending);
    let api = backend.session(ADMIN_TOKEN);

    for _ in 0..2 {
        let updated = api
            .registrations()
            .update_status(reg, RegistrationStatus::Confirmed)
            .await
            .expect("update status");
        assert_eq!(updated.status, RegistrationStatus::Confirmed);
    }

    assert_eq!(backend.status_writes(), 1);
    assert_eq!(
        backend.registration_status(reg),
        Some(RegistrationStatus::Confirmed)
    );
}

#[tokio::test]
async fn registration_views_are_filtered_server_side() {
    let backend = FakeBackend::start().await;
    let tb = backend.seed_teambuilding("Escape room");
    let first = backend.seed_event(tb, "Room A", noon(2030, 7, 1), 6);
    let second = backend.seed_event(tb, "Room B", noon(2030, 7, 2), 6);
    backend.seed_registration(first, ADMIN_EMAIL, RegistrationStatus::Pending);
    backend.seed_registration(first, "lee@eventhub.test", RegistrationStatus::Confirmed);
    backend.seed_registration(second, "lee@eventhub.test", RegistrationStatus::Pending);
    let api = backend.session(ADMIN_TOKEN);
    let service = api.registrations();

    let all = service
        .list(&RegistrationFilter::default())
        .await
        .expect("list");
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].event_name.as_deref(), Some("Room A"));
    assert_eq!(all[0].teambuilding_name.as_deref(), Some("Escape room"));

    let by_event = service.by_event(second).await.expect("by event");
    assert_eq!(by_event.len(), 1);

    let pending = service
        .by_status(RegistrationStatus::Pending)
        .await
        .expect("by status");
    assert_eq!(pending.len(), 2);

    let mine = service.mine().await.expect("mine");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].user_email.as_deref(), Some(ADMIN_EMAIL));
}

#[tokio::test]
async fn availability_ignores_cancelled_registrations() {
    let backend = FakeBackend::start().await;
    let tb = backend.seed_teambuilding("Wine tasting");
    let event = backend.seed_event(tb, "Tasting", noon(2030, 8, 1), 2);
    backend.seed_registration(event, "a@eventhub.test", RegistrationStatus::Confirmed);
    backend.seed_registration(event, "b@eventhub.test", RegistrationStatus::Cancelled);

    let availability = backend
        .session(ADMIN_TOKEN)
        .events()
        .availability(event)
        .await
        .expect("availability");
    assert!(availability.available);
    assert_eq!(availability.current_participants, 1);
    assert_eq!(availability.slots_remaining, Some(1));
}

#[tokio::test]
async fn upcoming_events_are_sorted_and_limited() {
    let backend = FakeBackend::start().await;
    let tb = backend.seed_teambuilding("Quarterly");
    backend.seed_event(tb, "Past", noon(2020, 1, 1), 5);
    backend.seed_event(tb, "Later", noon(2031, 3, 1), 5);
    backend.seed_event(tb, "Sooner", noon(2030, 3, 1), 5);
    backend.seed_event(tb, "Latest", noon(2032, 3, 1), 5);

    let upcoming = backend
        .session(ADMIN_TOKEN)
        .events()
        .upcoming(2)
        .await
        .expect("upcoming");
    let names: Vec<&str> = upcoming.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Sooner", "Later"]);
}

#[tokio::test]
async fn image_upload_returns_a_resolvable_url() {
    let backend = FakeBackend::start().await;
    let api = backend.session(ADMIN_TOKEN);

    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    let image = api
        .upload()
        .upload_image(ImageFile::new("team.png", None, png))
        .await
        .expect("upload");
    assert_eq!(image.url, "/uploads/1-team.png");
    assert_eq!(image.size, Some(8));

    let absolute = api.client().asset_url(&image.url);
    assert!(absolute.starts_with("http://127.0.0.1:"));
    assert!(absolute.ends_with("/uploads/1-team.png"));
}

#[tokio::test]
async fn upload_limits_are_enforced_by_the_backend() {
    let backend = FakeBackend::start().await;
    let api = backend.session(ADMIN_TOKEN);

    let err = api
        .upload()
        .upload_image(ImageFile::new(
            "notes.txt",
            Some("text/plain".to_string()),
            b"not an image".to_vec(),
        ))
        .await
        .expect_err("non-image rejected");
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.detail(), "File must be an image");

    let oversized = vec![0u8; eventhub_integration_tests::MAX_UPLOAD_BYTES + 1];
    let err = api
        .upload()
        .upload_image(ImageFile::new("huge.jpg", None, oversized))
        .await
        .expect_err("oversized rejected");
    assert_eq!(err.status(), Some(413));
}

#[tokio::test]
async fn profile_updates_round_trip() {
    let backend = FakeBackend::start().await;
    let api = backend.session(ADMIN_TOKEN);

    let me = api.profile().me().await.expect("me");
    assert_eq!(me.display_name(), ADMIN_NAME);

    let update = eventhub_core::ProfileUpdate {
        name: Some("Olivia O.".to_string()),
        ..eventhub_core::ProfileUpdate::default()
    };
    api.profile().update(&update).await.expect("update");
    assert_eq!(api.profile().me().await.expect("me").name, "Olivia O.");
}
