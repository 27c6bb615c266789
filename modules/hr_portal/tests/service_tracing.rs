//! Tests to verify that the service layer emits expected tracing events

mod common;

use hr_portal::InMemoryStorage;
use tracing_test::traced_test;

use common::*;

#[traced_test]
#[test]
fn first_start_logs_seeding() {
    // Arrange
    let storage = InMemoryStorage::new();

    // Act
    let (service, _notifier) = start(&storage);

    // Assert
    assert_eq!(service.store().collections().accounts.len(), 1);
    assert!(logs_contain("no snapshot found, seeding initial data"));
    assert!(logs_contain("snapshot saved"));
}

#[traced_test]
#[test]
fn register_and_login_emit_events() {
    // Arrange
    let (mut service, _n, _s) = start_fresh();

    // Act
    service.register(registration("bob@x.com", "secret1")).unwrap();
    service.verify_email("bob@x.com").unwrap();
    service.login("bob@x.com", "secret1").unwrap();

    // Assert
    assert!(logs_contain("hr_portal.service.register"));
    assert!(logs_contain("Registration successful, awaiting verification"));
    assert!(logs_contain("Email verified"));
    assert!(logs_contain("Login successful"));
}

#[traced_test]
#[test]
fn failed_save_is_logged() {
    // Arrange
    let (mut service, _n, storage) = start_fresh();
    login_admin(&mut service);
    storage.set_quota(Some(16));

    // Act
    service
        .create_employee(employee_form("E-1", "admin@example.com"))
        .unwrap();

    // Assert
    assert!(logs_contain("Error saving to storage"));
    assert!(logs_contain("storage quota exceeded"));
}

#[traced_test]
#[test]
fn router_redirect_is_logged() {
    // Arrange
    let (service, notifier, _s) = start_fresh();
    let router = hr_portal::Router::new(notifier);
    let mut renderer = RecordingRenderer::default();

    // Act
    let nav = router.navigate(&service, "#/profile", &mut renderer);

    // Assert
    assert!(nav.redirected());
    assert!(logs_contain("Please log in to access this page"));
}
