//! Page handlers of the admin driven through a signed-in browser.

use eventhub_core::RegistrationStatus;
use eventhub_integration_tests::{ADMIN_NAME, AdminServer, FakeBackend, noon};
use reqwest::{Client, StatusCode, header::LOCATION};

/// Backend, admin server and a browser that has completed login.
async fn signed_in() -> (FakeBackend, AdminServer, Client) {
    let backend = FakeBackend::start().await;
    let admin = AdminServer::start(&backend).await;
    let browser = AdminServer::browser();
    let landing = admin.login(&browser).await;
    assert_eq!(landing.url().path(), "/dashboard");
    (backend, admin, browser)
}

#[tokio::test]
async fn health_endpoints_report_backend_reachability() {
    let backend = FakeBackend::start().await;
    let admin = AdminServer::start(&backend).await;
    let client = Client::new();

    let health = client.get(admin.url("/health")).send().await.expect("health");
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await.expect("body"), "ok");

    let ready = client
        .get(admin.url("/health/ready"))
        .send()
        .await
        .expect("ready");
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_pages_redirect_anonymous_visitors_to_login() {
    let backend = FakeBackend::start().await;
    let admin = AdminServer::start(&backend).await;
    let browser = AdminServer::manual_browser();

    for path in ["/dashboard", "/teambuildings", "/events", "/registrations", "/profile"] {
        let response = browser.get(admin.url(path)).send().await.expect("request");
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.headers()[LOCATION], "/login", "{path}");
    }
}

#[tokio::test]
async fn dashboard_shows_counts_and_the_signed_in_user() {
    let (backend, admin, browser) = signed_in().await;
    let tb = backend.seed_teambuilding("Sailing trip");
    let event = backend.seed_event(tb, "Regatta", noon(2030, 5, 4), 20);
    backend.seed_registration(event, "kim@eventhub.test", RegistrationStatus::Pending);

    let body = browser
        .get(admin.url("/dashboard"))
        .send()
        .await
        .expect("dashboard")
        .text()
        .await
        .expect("body");
    assert!(body.contains("Logged in as"));
    assert!(body.contains(ADMIN_NAME));
    assert!(body.contains("kim@eventhub.test"));
    assert!(body.contains("Regatta"));
}

#[tokio::test]
async fn teambuilding_form_creates_and_reloads_the_list() {
    let (backend, admin, browser) = signed_in().await;

    let response = browser
        .post(admin.url("/teambuildings"))
        .form(&[
            ("name", "Bike tour"),
            ("description", ""),
            ("location", "Bruges"),
            ("start_date", "2030-05-01"),
            ("end_date", "2030-05-02"),
            ("budget", "900"),
            ("image_url", ""),
            ("status", "active"),
        ])
        .send()
        .await
        .expect("create");

    assert_eq!(response.url().path(), "/teambuildings");
    let body = response.text().await.expect("body");
    assert!(body.contains("Bike tour"));
    assert!(body.contains("900.00"));
    assert_eq!(backend.teambuilding_count(), 1);
}

#[tokio::test]
async fn invalid_teambuilding_form_never_reaches_the_backend() {
    let (backend, admin, browser) = signed_in().await;

    let response = browser
        .post(admin.url("/teambuildings"))
        .form(&[
            ("name", "Backwards"),
            ("start_date", "2030-05-02"),
            ("end_date", "2030-05-01"),
            ("status", "active"),
        ])
        .send()
        .await
        .expect("submit");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("End date must not be before the start date"));
    assert_eq!(backend.teambuilding_count(), 0);
}

#[tokio::test]
async fn refused_delete_shows_the_backend_message() {
    let (backend, admin, browser) = signed_in().await;
    let tb = backend.seed_teambuilding("Team lunch");
    backend.seed_event(tb, "Lunch", noon(2030, 4, 4), 30);

    let response = browser
        .post(admin.url(&format!("/teambuildings/{tb}/delete")))
        .send()
        .await
        .expect("delete");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("Cannot delete teambuilding with existing events"));
    assert!(body.contains("Team lunch"));
    assert_eq!(backend.teambuilding_count(), 1);
}

#[tokio::test]
async fn events_can_be_filtered_by_teambuilding() {
    let (backend, admin, browser) = signed_in().await;
    let first = backend.seed_teambuilding("Spring offsite");
    let second = backend.seed_teambuilding("Autumn offsite");
    backend.seed_event(first, "Tulip walk", noon(2030, 4, 10), 15);
    backend.seed_event(second, "Mushroom hunt", noon(2030, 10, 10), 15);

    let body = browser
        .get(admin.url(&format!("/events?teambuilding_id={second}")))
        .send()
        .await
        .expect("events")
        .text()
        .await
        .expect("body");
    assert!(body.contains("Mushroom hunt"));
    assert!(!body.contains("Tulip walk"));
}

#[tokio::test]
async fn event_image_upload_fills_the_form() {
    let (_backend, admin, browser) = signed_in().await;

    let form = reqwest::multipart::Form::new()
        .text("name", "Photo walk")
        .text("max_participants", "12")
        .part(
            "file",
            reqwest::multipart::Part::bytes(vec![0xff, 0xd8, 0xff, 0xe0])
                .file_name("walk.jpg")
                .mime_str("image/jpeg")
                .expect("mime"),
        );

    let response = browser
        .post(admin.url("/events/image"))
        .multipart(form)
        .send()
        .await
        .expect("upload");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("1-walk.jpg"));
    assert!(body.contains("Photo walk"));
}

#[tokio::test]
async fn status_change_returns_to_the_filtered_list() {
    let (backend, admin, browser) = signed_in().await;
    let tb = backend.seed_teambuilding("Board games");
    let event = backend.seed_event(tb, "Game night", noon(2030, 2, 2), 8);
    let reg = backend.seed_registration(event, "max@eventhub.test", RegistrationStatus::Pending);

    let response = browser
        .post(admin.url(&format!("/registrations/{reg}/status")))
        .form(&[("status", "confirmed"), ("return_to", "/registrations?status=pending")])
        .send()
        .await
        .expect("status change");

    assert_eq!(response.url().path(), "/registrations");
    assert_eq!(response.url().query(), Some("status=pending"));
    assert_eq!(
        backend.registration_status(reg),
        Some(RegistrationStatus::Confirmed)
    );
}

#[tokio::test]
async fn foreign_return_targets_fall_back_to_the_list() {
    let (backend, admin, browser) = signed_in().await;
    let tb = backend.seed_teambuilding("Karting");
    let event = backend.seed_event(tb, "Grand prix", noon(2030, 3, 3), 8);
    let reg = backend.seed_registration(event, "jo@eventhub.test", RegistrationStatus::Pending);

    let response = browser
        .post(admin.url(&format!("/registrations/{reg}/status")))
        .form(&[("status", "cancelled"), ("return_to", "https://evil.test/")])
        .send()
        .await
        .expect("status change");
    assert_eq!(response.url().path(), "/registrations");
    assert_eq!(response.url().query(), None);
}

#[tokio::test]
async fn profile_update_refreshes_the_layout_name() {
    let (_backend, admin, browser) = signed_in().await;

    let response = browser
        .post(admin.url("/profile"))
        .form(&[("name", "Olivia Operations"), ("phone", ""), ("avatar_url", "")])
        .send()
        .await
        .expect("profile update");

    assert_eq!(response.url().path(), "/profile");
    let body = response.text().await.expect("body");
    assert!(body.contains("Olivia Operations"));
}

#[tokio::test]
async fn event_form_creates_updates_and_deletes() {
    let (backend, admin, browser) = signed_in().await;
    let tb = backend.seed_teambuilding("Harbour days");
    let tb_field = tb.to_string();

    let created = browser
        .post(admin.url("/events"))
        .form(&[
            ("editing_id", ""),
            ("teambuilding_id", tb_field.as_str()),
            ("name", "Canal cruise"),
            ("description", ""),
            ("event_date", "2030-06-02T10:00"),
            ("location", ""),
            ("max_participants", "25"),
            ("image_url", ""),
            ("file", ""),
        ])
        .send()
        .await
        .expect("create");

    assert_eq!(created.status(), StatusCode::OK);
    assert_eq!(created.url().path(), "/events");
    assert!(created.text().await.expect("body").contains("Canal cruise"));
    let events = backend.events();
    assert_eq!(events.len(), 1);
    let event = events.first().expect("created event");
    assert_eq!(event.name, "Canal cruise");
    assert_eq!(event.max_participants, Some(25));

    let updated = browser
        .post(admin.url(&format!("/events/{}", event.id)))
        .form(&[
            ("editing_id", event.id.to_string().as_str()),
            ("teambuilding_id", tb_field.as_str()),
            ("name", "Night cruise"),
            ("description", "Lights on the water"),
            ("event_date", "2030-06-02T21:00"),
            ("location", "Old harbour"),
            ("max_participants", "10"),
            ("image_url", "/uploads/a.jpg"),
        ])
        .send()
        .await
        .expect("update");

    assert_eq!(updated.url().path(), "/events");
    let body = updated.text().await.expect("body");
    assert!(body.contains("Night cruise"));
    assert!(!body.contains("Canal cruise"));
    let events = backend.events();
    assert_eq!(events.len(), 1);
    let event = events.first().expect("updated event");
    assert_eq!(event.name, "Night cruise");
    assert_eq!(event.max_participants, Some(10));
    assert_eq!(event.image_url.as_deref(), Some("/uploads/a.jpg"));

    let deleted = browser
        .post(admin.url(&format!("/events/{}/delete", event.id)))
        .send()
        .await
        .expect("delete");

    assert_eq!(deleted.url().path(), "/events");
    let body = deleted.text().await.expect("body");
    assert!(body.contains("No events found."));
    assert!(backend.events().is_empty());
}

#[tokio::test]
async fn failed_list_fetch_shows_the_error_instead_of_rows() {
    let (backend, admin, browser) = signed_in().await;
    let tb = backend.seed_teambuilding("Cooking class");
    backend.seed_event(tb, "Pasta workshop", noon(2030, 6, 2), 12);
    backend.fail_reads(StatusCode::SERVICE_UNAVAILABLE);

    let events = browser
        .get(admin.url("/events"))
        .send()
        .await
        .expect("events")
        .text()
        .await
        .expect("body");
    assert!(events.contains("Database temporarily unavailable"));
    assert!(events.contains("No events found."));
    assert!(!events.contains("Pasta workshop"));
    assert!(!events.contains("Cooking class"));

    let teambuildings = browser
        .get(admin.url("/teambuildings"))
        .send()
        .await
        .expect("teambuildings")
        .text()
        .await
        .expect("body");
    assert!(teambuildings.contains("Database temporarily unavailable"));
    assert!(teambuildings.contains("No teambuildings found."));
    assert!(!teambuildings.contains("Cooking class"));

    backend.restore_reads();
    let recovered = browser
        .get(admin.url("/events"))
        .send()
        .await
        .expect("events")
        .text()
        .await
        .expect("body");
    assert!(recovered.contains("Pasta workshop"));
}
