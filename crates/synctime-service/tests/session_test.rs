//! Session lifecycle and push ingestion over the in-memory transport.

mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::timeout;

use synctime_core::config::realtime::RealtimeConfig;
use synctime_core::types::id::UserId;
use synctime_realtime::connection::{MemoryPeer, MemoryServer, MemoryTransport};
use synctime_realtime::{ChannelHub, ChannelState, EVENT_NEW_NOTIFICATION};
use synctime_service::{FlashLog, Session, SessionContext, SessionDeps};

use common::{MockCalendar, MockRemote, id};

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    context: SessionContext,
    hub: ChannelHub,
    server: MemoryServer,
}

fn harness() -> Harness {
    let (transport, server) = MemoryTransport::pair();
    let hub = ChannelHub::new(
        Arc::new(transport),
        RealtimeConfig {
            url: "ws://push.test/socket".to_string(),
            auth_timeout_seconds: 5,
            reconnect_initial_ms: 10,
            reconnect_max_ms: 40,
            reconnect_multiplier: 2.0,
            max_frame_bytes: 65_536,
        },
    );
    let context = SessionContext::new(SessionDeps {
        notifications: MockRemote::with_records(vec![]),
        calendar: Arc::new(MockCalendar::default()),
        hub: hub.clone(),
        flash: Arc::new(FlashLog::new()),
        mark_read_on_load: false,
    });
    Harness {
        context,
        hub,
        server,
    }
}

/// Accepts the session's connection and completes the handshake.
async fn ready_peer(server: &MemoryServer, session: &Session) -> MemoryPeer {
    let mut peer = timeout(WAIT, server.accept()).await.unwrap().unwrap();
    let auth = timeout(WAIT, peer.recv_frame()).await.unwrap().unwrap();
    assert_eq!(auth.event, "auth");
    assert_eq!(auth.data, json!({ "userId": session.user_id().as_str() }));

    peer.send_event("authSuccess", Value::Null);
    let mut state = session.watch_channel().expect("feed mounted");
    timeout(WAIT, state.wait_for(ChannelState::is_ready))
        .await
        .unwrap()
        .unwrap();
    peer
}

async fn wait_for_len(session: &Session, len: usize) {
    let mut revisions = session.store().subscribe();
    timeout(WAIT, async {
        while session.store().len() != len {
            revisions.changed().await.unwrap();
        }
    })
    .await
    .expect("store reached expected length");
}

#[tokio::test]
async fn test_push_is_ingested_newest_first_and_counted() {
    let h = harness();
    let session = h.context.sign_in(UserId::from("u-1")).unwrap();
    let peer = ready_peer(&h.server, &session).await;

    peer.send_event(EVENT_NEW_NOTIFICATION, json!({"id": 1, "title": "Primeira", "entity": "Nota"}));
    peer.send_event(EVENT_NEW_NOTIFICATION, json!({"id": 2, "title": "Segunda", "entity": "Conta"}));
    peer.send_event(EVENT_NEW_NOTIFICATION, json!({"id": 1, "title": "Repetida"}));
    peer.send_event(EVENT_NEW_NOTIFICATION, json!({"title": "sem id"}));
    wait_for_len(&session, 2).await;

    let ids: Vec<String> = session.store().snapshot().into_iter().map(|r| r.id.0).collect();
    assert_eq!(ids, vec!["2", "1"]);
    assert_eq!(session.store().get(&id(1)).unwrap().text, "Primeira");
    assert_eq!(session.badge().view().unseen, 2);
}

#[tokio::test]
async fn test_sign_out_closes_channel_and_stops_ingestion() {
    let h = harness();
    let session = h.context.sign_in(UserId::from("u-1")).unwrap();
    let mut peer = ready_peer(&h.server, &session).await;

    peer.send_event(EVENT_NEW_NOTIFICATION, json!({"id": 1, "title": "antes"}));
    wait_for_len(&session, 1).await;

    assert!(h.context.sign_out());
    assert!(!session.is_live());
    assert_eq!(h.hub.active_channels(), 0);
    timeout(WAIT, peer.closed()).await.unwrap();

    peer.send_event(EVENT_NEW_NOTIFICATION, json!({"id": 2, "title": "depois"}));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(session.store().len(), 1);
    assert_eq!(session.badge().view().unseen, 1);
    assert_eq!(h.server.connect_attempts(), 1);
    assert!(h.context.current().is_none());
    assert!(!h.context.sign_out());
}

#[tokio::test]
async fn test_extra_consumer_keeps_channel_open() {
    let h = harness();
    let user = UserId::from("u-1");
    let session = h.context.sign_in(user.clone()).unwrap();
    let mut peer = ready_peer(&h.server, &session).await;

    let extra = session.mount_feed().unwrap();
    assert_eq!(h.hub.lease_count(&user), 2);

    session.close();
    assert_eq!(h.hub.lease_count(&user), 1);
    assert!(extra.is_active());

    // Only the extra feed's handler remains; the record lands exactly once.
    peer.send_event(EVENT_NEW_NOTIFICATION, json!({"id": 5, "title": "x"}));
    wait_for_len(&session, 1).await;
    assert_eq!(session.badge().view().unseen, 1);

    extra.unmount();
    assert_eq!(h.hub.active_channels(), 0);
    timeout(WAIT, peer.closed()).await.unwrap();
    assert!(session.mount_feed().is_err());
}

#[tokio::test]
async fn test_switching_user_replaces_session() {
    let h = harness();
    let first = h.context.sign_in(UserId::from("a")).unwrap();
    let again = h.context.sign_in(UserId::from("a")).unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    let second = h.context.sign_in(UserId::from("b")).unwrap();
    assert!(!first.is_live());
    assert!(second.is_live());
    assert_eq!(h.hub.active_channels(), 1);
    assert_eq!(h.hub.lease_count(&UserId::from("b")), 1);

    assert!(h.context.sign_in(UserId::from(" ")).is_err());
}

#[tokio::test]
async fn test_sign_in_from_memorized_filter() {
    let h = harness();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"id": 314, "startDate": "2026-10-01"}}"#).unwrap();

    let session = h.context.sign_in_from(file.path()).await.unwrap();

    assert_eq!(session.user_id(), &UserId::from("314"));
    let peer = ready_peer(&h.server, &session).await;
    assert_eq!(peer.url, "ws://push.test/socket");
}
