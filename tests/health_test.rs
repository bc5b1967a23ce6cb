//! Health monitor driving liveness of a running balancer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use role_balancer::auth::Role;

mod common;
use common::{backend_id, client, config_for, send, start_backend, start_balancer};

#[tokio::test]
async fn test_failed_probes_evict_and_recovery_restores() {
    let b1 = start_backend(1).await;

    let b2_healthy = Arc::new(AtomicBool::new(true));
    let flag = b2_healthy.clone();
    let b2 = common::start_programmable_backend(move |path| {
        let flag = flag.clone();
        async move {
            match (path.as_str(), flag.load(Ordering::SeqCst)) {
                ("/health", true) => (200, "Backend 2 is healthy".to_string()),
                ("/health", false) => (500, "dead".to_string()),
                _ => (200, "Response from Backend 2".to_string()),
            }
        }
    })
    .await;

    let mut config = config_for(&[b1, b2]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    let lb = start_balancer(config).await;
    let client = client();

    b2_healthy.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let backend = lb.pool.get(1).unwrap();
    assert!(!backend.is_alive());
    assert!(backend.consecutive_failures() >= 1);

    for _ in 0..10 {
        let (status, body) = send(&client, &lb.url, Role::User).await;
        assert_eq!(status, 200);
        assert_eq!(backend_id(&body), Some(1));
    }

    b2_healthy.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(lb.pool.get(1).unwrap().is_alive());
    assert_eq!(lb.pool.get(1).unwrap().consecutive_failures(), 0);

    let mut saw_b2 = false;
    for _ in 0..4 {
        let (_, body) = send(&client, &lb.url, Role::User).await;
        saw_b2 |= backend_id(&body) == Some(2);
    }
    assert!(saw_b2, "recovered backend should receive traffic again");
}

#[tokio::test]
async fn test_unreachable_backend_marked_down() {
    let b1 = start_backend(1).await;
    let dead = common::dead_addr().await;

    let mut config = config_for(&[b1, dead]);
    config.health_check.enabled = true;
    config.health_check.interval_secs = 1;
    config.health_check.timeout_secs = 1;
    let lb = start_balancer(config).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let snap = lb.pool.list_backends();
    assert!(snap[0].alive);
    assert!(!snap[1].alive);
    assert!(snap[1].consecutive_failures >= 1);
}
