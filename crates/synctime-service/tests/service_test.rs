//! Notification service behaviour against a scripted API.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use synctime_core::error::ErrorKind;
use synctime_core::types::filter::{StatusFilter, TypeFilter};
use synctime_core::types::id::UserId;
use synctime_service::{FlashLog, NotificationService, NotificationStore};

use common::{Gate, MockRemote, id, record};

fn service(remote: &Arc<MockRemote>, mark_read_on_load: bool) -> (Arc<NotificationService>, Arc<FlashLog>) {
    let flash = Arc::new(FlashLog::new());
    let service = NotificationService::new(
        UserId::from("u-1"),
        remote.clone(),
        NotificationStore::new(),
        flash.clone(),
        mark_read_on_load,
    );
    (Arc::new(service), flash)
}

fn ids(service: &NotificationService) -> Vec<String> {
    service.store().snapshot().into_iter().map(|r| r.id.0).collect()
}

#[tokio::test]
async fn test_load_replaces_store() {
    let remote = MockRemote::with_records(vec![record(2, false, "Conta"), record(1, true, "Nota")]);
    let (service, flash) = service(&remote, false);
    service.store().ingest(record(9, false, "Nota"));

    assert_eq!(service.load().await.unwrap(), 2);
    assert_eq!(ids(&service), vec!["2", "1"]);
    assert!(flash.messages().is_empty());
    assert_eq!(remote.calls(), vec!["list:u-1"]);
}

#[tokio::test]
async fn test_failed_load_leaves_store_and_flashes() {
    let remote = MockRemote::with_records(vec![record(1, false, "Nota")]);
    let (service, flash) = service(&remote, false);
    service.load().await.unwrap();

    remote.set_records(vec![]);
    remote.fail_list.store(true, Ordering::SeqCst);
    let err = service.load().await.unwrap_err();

    assert!(err.is_transient());
    assert_eq!(ids(&service), vec!["1"]);
    assert_eq!(flash.error_count(), 1);
}

#[tokio::test]
async fn test_load_confirms_unread_on_server_but_keeps_local_flags() {
    let remote = MockRemote::with_records(vec![
        record(3, false, "Nota"),
        record(2, true, "Nota"),
        record(1, false, "Conta"),
    ]);
    let (service, _flash) = service(&remote, true);

    service.load().await.unwrap();

    assert_eq!(remote.calls(), vec!["list:u-1", "mark_read:3,1"]);
    assert_eq!(service.store().counts(&TypeFilter::All).unread, 2);
}

#[tokio::test]
async fn test_mark_read_confirmed() {
    let remote = MockRemote::with_records(vec![record(1, false, "Nota")]);
    let (service, flash) = service(&remote, false);
    service.load().await.unwrap();

    service.mark_read(&id(1)).await.unwrap();
    service.mark_read(&id(1)).await.unwrap();

    assert!(service.store().get(&id(1)).unwrap().read);
    // Already read the second time: no second round trip.
    assert_eq!(remote.calls(), vec!["list:u-1", "mark_read:1"]);
    assert!(flash.messages().is_empty());
}

#[tokio::test]
async fn test_mark_read_failure_rolls_back_and_flashes() {
    let remote = MockRemote::with_records(vec![record(1, false, "Nota")]);
    let (service, flash) = service(&remote, false);
    service.load().await.unwrap();
    remote.fail_mark_read.store(true, Ordering::SeqCst);

    let err = service.mark_read(&id(1)).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert!(!service.store().get(&id(1)).unwrap().read);
    assert_eq!(flash.error_count(), 1);
}

#[tokio::test]
async fn test_later_reload_wins_over_failed_mark_read() {
    let remote = MockRemote::with_records(vec![record(1, false, "Nota")]);
    let (service, _flash) = service(&remote, false);
    service.load().await.unwrap();

    let gate = Arc::new(Gate::default());
    *remote.mark_read_gate.lock().unwrap() = Some(gate.clone());
    remote.fail_mark_read.store(true, Ordering::SeqCst);

    let pending = tokio::spawn({
        let service = service.clone();
        async move { service.mark_read(&id(1)).await }
    });
    gate.entered.notified().await;
    assert!(service.store().get(&id(1)).unwrap().read);

    // The server now reports it read; this fetch happens after the click.
    *remote.mark_read_gate.lock().unwrap() = None;
    remote.set_records(vec![record(1, true, "Nota")]);
    service.load().await.unwrap();

    gate.release.notify_one();
    assert!(pending.await.unwrap().is_err());
    assert!(service.store().get(&id(1)).unwrap().read);
}

#[tokio::test]
async fn test_delete_after_pending_mark_read_stays_deleted() {
    let remote = MockRemote::with_records(vec![record(1, false, "Nota"), record(2, false, "Nota")]);
    let (service, _flash) = service(&remote, false);
    service.load().await.unwrap();

    let gate = Arc::new(Gate::default());
    *remote.mark_read_gate.lock().unwrap() = Some(gate.clone());
    remote.fail_mark_read.store(true, Ordering::SeqCst);

    let pending = tokio::spawn({
        let service = service.clone();
        async move { service.mark_read(&id(1)).await }
    });
    gate.entered.notified().await;

    service.delete(&id(1)).await.unwrap();
    gate.release.notify_one();
    assert!(pending.await.unwrap().is_err());

    assert_eq!(ids(&service), vec!["2"]);
}

#[tokio::test]
async fn test_delete_waits_for_confirmation() {
    let remote = MockRemote::with_records(vec![record(1, false, "Nota")]);
    let (service, flash) = service(&remote, false);
    service.load().await.unwrap();

    remote.fail_delete.store(true, Ordering::SeqCst);
    assert!(service.delete(&id(1)).await.is_err());
    assert_eq!(ids(&service), vec!["1"]);
    assert_eq!(flash.error_count(), 1);

    remote.fail_delete.store(false, Ordering::SeqCst);
    service.delete(&id(1)).await.unwrap();
    assert!(service.store().is_empty());

    let err = service.delete(&id(1)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_clear_read_on_type_filter_removes_only_matching() {
    let remote = MockRemote::with_records(vec![record(1, true, "Conta"), record(2, true, "Nota")]);
    let (service, _flash) = service(&remote, false);
    service.load().await.unwrap();

    let removed = service.clear_read(&TypeFilter::entity("Conta")).await.unwrap();

    assert_eq!(removed, 1);
    assert_eq!(ids(&service), vec!["2"]);
    assert!(remote.calls().contains(&"delete:1".to_string()));
}

#[tokio::test]
async fn test_clear_read_with_nothing_read_skips_the_api() {
    let remote = MockRemote::with_records(vec![record(1, false, "Conta")]);
    let (service, _flash) = service(&remote, false);
    service.load().await.unwrap();

    assert_eq!(service.clear_read(&TypeFilter::All).await.unwrap(), 0);
    assert_eq!(remote.calls(), vec!["list:u-1"]);
    assert_eq!(
        service.store().filtered(StatusFilter::All, &TypeFilter::All).len(),
        1
    );
}
