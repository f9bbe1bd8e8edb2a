//! Bell badge: the unseen counter shown in the header.
//!
//! "Seen" is a separate dimension from "read". The badge starts from the
//! count endpoint, follows push deltas, and is reset when the dropdown is
//! closed and the server confirms "mark all seen".

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use synctime_api::NotificationRemote;
use synctime_core::result::AppResult;
use synctime_entity::PushNotification;

use crate::flash::{FlashMessage, FlashSink};

pub(crate) const MARK_SEEN_FAILED: &str = "Não foi possível atualizar o contador";

/// What the badge renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BadgeView {
    /// Count fetch in flight.
    pub loading: bool,
    /// Displayed unseen count.
    pub unseen: u64,
}

/// Locally held unseen counter.
pub struct BadgeCounter {
    remote: Arc<dyn NotificationRemote>,
    flash: Arc<dyn FlashSink>,
    view: watch::Sender<BadgeView>,
    /// Pushes applied so far; bumped under the view lock.
    pushes: AtomicU64,
    /// Pushes that carried an absolute count.
    absolutes: AtomicU64,
}

impl std::fmt::Debug for BadgeCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BadgeCounter")
            .field("view", &*self.view.borrow())
            .finish()
    }
}

impl BadgeCounter {
    pub fn new(remote: Arc<dyn NotificationRemote>, flash: Arc<dyn FlashSink>) -> Self {
        let (view, _) = watch::channel(BadgeView::default());
        Self {
            remote,
            flash,
            view,
            pushes: AtomicU64::new(0),
            absolutes: AtomicU64::new(0),
        }
    }

    /// Current badge state.
    pub fn view(&self) -> BadgeView {
        *self.view.borrow()
    }

    /// Receiver notified on every badge change.
    pub fn subscribe(&self) -> watch::Receiver<BadgeView> {
        self.view.subscribe()
    }

    /// Re-initialises the count from the server.
    ///
    /// Pushes applied while the fetch is in flight are newer than the
    /// answer: an absolute count received meanwhile is kept, and plain
    /// increments never let the badge move backwards.
    pub async fn refresh(&self) -> AppResult<u64> {
        let mut since = (0, 0);
        self.view.send_modify(|v| {
            v.loading = true;
            since = (
                self.pushes.load(Ordering::SeqCst),
                self.absolutes.load(Ordering::SeqCst),
            );
        });

        match self.remote.unseen_count().await {
            Ok(server) => {
                let mut unseen = server;
                self.view.send_modify(|v| {
                    if self.absolutes.load(Ordering::SeqCst) != since.1 {
                        unseen = v.unseen;
                    } else if self.pushes.load(Ordering::SeqCst) != since.0 {
                        unseen = server.max(v.unseen);
                    }
                    v.loading = false;
                    v.unseen = unseen;
                });
                debug!(server, unseen, "Badge count refreshed");
                Ok(unseen)
            }
            Err(e) => {
                self.view.send_modify(|v| v.loading = false);
                warn!(error = %e, "Failed to fetch unseen count");
                self.flash
                    .flash(FlashMessage::error("Não foi possível carregar o contador"));
                Err(e)
            }
        }
    }

    /// Applies one push: the absolute count wins over the local increment.
    pub fn apply_push(&self, push: &PushNotification) {
        self.view.send_modify(|v| {
            self.pushes.fetch_add(1, Ordering::SeqCst);
            v.unseen = match push.count {
                Some(absolute) => {
                    self.absolutes.fetch_add(1, Ordering::SeqCst);
                    absolute
                }
                None => v.unseen.saturating_add(push.unseen_delta()),
            };
        });
    }

    /// Tells the server everything was seen and zeroes the badge.
    pub async fn mark_seen(&self) -> AppResult<()> {
        self.reset_seen().await.inspect_err(|_| {
            self.flash.flash(FlashMessage::error(MARK_SEEN_FAILED));
        })
    }

    /// Marks everything seen and resets the badge, without flashing.
    pub(crate) async fn reset_seen(&self) -> AppResult<()> {
        if let Err(e) = self.remote.mark_all_seen().await {
            warn!(error = %e, "Failed to mark notifications seen");
            return Err(e);
        }
        self.view.send_modify(|v| v.unseen = 0);
        Ok(())
    }
}
