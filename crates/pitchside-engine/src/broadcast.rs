//! Realtime leaderboard fan-out.
//!
//! One shared push loop per contest, not one per subscriber: every interval
//! the loop takes a single `read_snapshot` and fans the resulting message
//! out to all current subscribers. Snapshot failures become explicit
//! [`ServerMessage::LeaderboardError`] messages — a subscriber is told, not
//! silently dropped. Dropping a [`Subscription`] removes only that
//! subscriber; the loop ends when the last one is gone, or after it has
//! pushed a finalized snapshot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pitchside_store::LeaderboardStore;
use pitchside_types::{ContestId, EngineConfig, ServerMessage};
use tokio::sync::mpsc;

type SubscriberList = Arc<Mutex<Vec<mpsc::Sender<ServerMessage>>>>;

/// A live subscription to one contest's leaderboard pushes.
///
/// Dropping it disconnects the subscriber; the contest's shared loop keeps
/// running for everyone else.
pub struct Subscription {
    pub contest_id: ContestId,
    receiver: mpsc::Receiver<ServerMessage>,
}

impl Subscription {
    /// Wait for the next pushed message. `None` once the loop has ended.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.receiver.recv().await
    }

    /// Non-blocking read, for draining in tests.
    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        self.receiver.try_recv().ok()
    }
}

/// Maintains per-contest subscriber sets and their shared push loops.
pub struct RealtimeBroadcaster {
    leaderboard: Arc<LeaderboardStore>,
    config: EngineConfig,
    loops: Arc<Mutex<HashMap<ContestId, SubscriberList>>>,
}

impl RealtimeBroadcaster {
    #[must_use]
    pub fn new(leaderboard: Arc<LeaderboardStore>, config: EngineConfig) -> Self {
        Self {
            leaderboard,
            config,
            loops: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register interest in a contest. The first subscriber spawns the
    /// contest's shared push loop; later ones just join its fan-out list.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(&self, contest_id: ContestId) -> Subscription {
        let (tx, rx) = mpsc::channel(self.config.subscriber_capacity);

        let mut loops = self.loops.lock().expect("broadcast registry poisoned");
        match loops.get(&contest_id) {
            Some(subscribers) => {
                subscribers
                    .lock()
                    .expect("subscriber list poisoned")
                    .push(tx);
            }
            None => {
                let subscribers: SubscriberList = Arc::new(Mutex::new(vec![tx]));
                loops.insert(contest_id, Arc::clone(&subscribers));
                tokio::spawn(push_loop(
                    Arc::clone(&self.leaderboard),
                    Arc::clone(&self.loops),
                    subscribers,
                    contest_id,
                    self.config.broadcast_interval,
                ));
                tracing::debug!(contest = %contest_id, "push loop started");
            }
        }

        Subscription {
            contest_id,
            receiver: rx,
        }
    }

    /// Number of live subscribers for a contest.
    #[must_use]
    pub fn subscriber_count(&self, contest_id: ContestId) -> usize {
        self.loops
            .lock()
            .expect("broadcast registry poisoned")
            .get(&contest_id)
            .map_or(0, |subs| {
                subs.lock().expect("subscriber list poisoned").len()
            })
    }

    /// Whether a push loop currently exists for the contest.
    #[must_use]
    pub fn has_loop(&self, contest_id: ContestId) -> bool {
        self.loops
            .lock()
            .expect("broadcast registry poisoned")
            .contains_key(&contest_id)
    }
}

/// The shared per-contest loop: snapshot once, fan out to everyone.
async fn push_loop(
    leaderboard: Arc<LeaderboardStore>,
    loops: Arc<Mutex<HashMap<ContestId, SubscriberList>>>,
    subscribers: SubscriberList,
    contest_id: ContestId,
    interval: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The immediate first tick would race the subscriber into an instant
    // snapshot; skip it so cadence starts one interval after subscribing.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let (message, finalized) = match leaderboard.read_snapshot(contest_id) {
            Ok(snapshot) => {
                let finalized = snapshot.is_finalized;
                (ServerMessage::from_snapshot(&snapshot), finalized)
            }
            Err(err) => (
                ServerMessage::LeaderboardError {
                    contest_id,
                    message: err.to_string(),
                },
                false,
            ),
        };

        // Fan out under both locks (registry, then list — same order as
        // subscribe) so exit and subscribe cannot race.
        let mut registry = loops.lock().expect("broadcast registry poisoned");
        let mut subs = subscribers.lock().expect("subscriber list poisoned");
        subs.retain(|tx| match tx.try_send(message.clone()) {
            Ok(()) => true,
            // Slow consumer: this interval's snapshot is dropped for them,
            // the subscription itself survives.
            Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });

        if subs.is_empty() {
            registry.remove(&contest_id);
            tracing::debug!(contest = %contest_id, "last subscriber gone, push loop cancelled");
            return;
        }
        if finalized {
            registry.remove(&contest_id);
            tracing::debug!(contest = %contest_id, "leaderboard finalized, push loop ending");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use pitchside_types::{EntryId, LeaderboardRow, UserId};
    use rust_decimal::Decimal;

    use super::*;

    fn fast_config() -> EngineConfig {
        EngineConfig::fast()
    }

    fn store_with_row(contest_id: ContestId) -> Arc<LeaderboardStore> {
        let store = Arc::new(LeaderboardStore::new());
        let entry_id = EntryId::new();
        store
            .insert_row(LeaderboardRow::seed(
                contest_id,
                entry_id,
                UserId::new(),
                "Push XI",
                Utc::now(),
            ))
            .unwrap();
        store
            .upsert_score(contest_id, entry_id, Decimal::new(12, 0))
            .unwrap();
        store.upsert_ranks(contest_id, &[(entry_id, 1)]).unwrap();
        store
    }

    #[tokio::test]
    async fn subscriber_receives_snapshots() {
        let contest_id = ContestId::new();
        let broadcaster = RealtimeBroadcaster::new(store_with_row(contest_id), fast_config());

        let mut sub = broadcaster.subscribe(contest_id);
        let msg = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("snapshot within one interval")
            .expect("loop alive");

        let ServerMessage::LeaderboardSnapshot {
            contest_id: cid,
            entries,
            is_finalized,
        } = msg
        else {
            panic!("expected snapshot");
        };
        assert_eq!(cid, contest_id);
        assert!(!is_finalized);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].rank, 1);
    }

    #[tokio::test]
    async fn one_loop_shared_by_many_subscribers() {
        let contest_id = ContestId::new();
        let broadcaster = RealtimeBroadcaster::new(store_with_row(contest_id), fast_config());

        let mut subs: Vec<Subscription> =
            (0..5).map(|_| broadcaster.subscribe(contest_id)).collect();
        assert_eq!(broadcaster.subscriber_count(contest_id), 5);

        for sub in &mut subs {
            let msg = tokio::time::timeout(Duration::from_secs(1), sub.recv())
                .await
                .expect("every subscriber gets the fan-out")
                .expect("loop alive");
            assert!(matches!(msg, ServerMessage::LeaderboardSnapshot { .. }));
        }
    }

    #[tokio::test]
    async fn disconnect_removes_only_that_subscriber() {
        let contest_id = ContestId::new();
        let broadcaster = RealtimeBroadcaster::new(store_with_row(contest_id), fast_config());

        let mut keeper = broadcaster.subscribe(contest_id);
        let dropped = broadcaster.subscribe(contest_id);
        drop(dropped);

        // The keeper still receives across several intervals.
        for _ in 0..2 {
            tokio::time::timeout(Duration::from_secs(1), keeper.recv())
                .await
                .expect("keeper still served")
                .expect("loop alive");
        }
        assert_eq!(broadcaster.subscriber_count(contest_id), 1);
    }

    #[tokio::test]
    async fn zero_subscribers_cancels_loop() {
        let contest_id = ContestId::new();
        let broadcaster = RealtimeBroadcaster::new(store_with_row(contest_id), fast_config());

        let sub = broadcaster.subscribe(contest_id);
        assert!(broadcaster.has_loop(contest_id));
        drop(sub);

        // After an interval the loop notices the empty list and deregisters.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!broadcaster.has_loop(contest_id));
    }

    #[tokio::test]
    async fn no_messages_after_unsubscribe() {
        let contest_id = ContestId::new();
        let broadcaster = RealtimeBroadcaster::new(store_with_row(contest_id), fast_config());

        let mut sub = broadcaster.subscribe(contest_id);
        tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .unwrap()
            .unwrap();

        drop(sub);
        let mut late = broadcaster.subscribe(contest_id);
        tokio::time::timeout(Duration::from_secs(1), late.recv())
            .await
            .unwrap()
            .unwrap();
        // The dropped subscription's channel is gone; nothing can observe a
        // message for it. The live one is unaffected — that is the contract.
        assert_eq!(broadcaster.subscriber_count(contest_id), 1);
    }

    #[tokio::test]
    async fn finalized_contest_gets_last_snapshot_then_loop_ends() {
        let contest_id = ContestId::new();
        let store = store_with_row(contest_id);
        store.finalize(contest_id).unwrap();

        let broadcaster = RealtimeBroadcaster::new(store, fast_config());
        let mut sub = broadcaster.subscribe(contest_id);

        let msg = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .unwrap()
            .unwrap();
        let ServerMessage::LeaderboardSnapshot { is_finalized, .. } = msg else {
            panic!("expected snapshot");
        };
        assert!(is_finalized);

        // Loop ends after the final push; the channel closes.
        let end = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("channel closes promptly");
        assert!(end.is_none());
        assert!(!broadcaster.has_loop(contest_id));
    }

    #[tokio::test]
    async fn cadence_at_most_one_snapshot_per_interval() {
        let contest_id = ContestId::new();
        let broadcaster = RealtimeBroadcaster::new(store_with_row(contest_id), fast_config());
        let interval = fast_config().broadcast_interval;

        let mut sub = broadcaster.subscribe(contest_id);

        // Observe for ~4 intervals; the count must not exceed the number of
        // elapsed intervals (plus one for timer skew).
        let window = interval * 4;
        let deadline = tokio::time::Instant::now() + window;
        let mut received = 0usize;
        while tokio::time::Instant::now() < deadline {
            if tokio::time::timeout(interval * 2, sub.recv()).await.is_ok() {
                received += 1;
            }
        }
        assert!(received >= 2, "loop must be pushing");
        assert!(
            received <= 5,
            "no more than one snapshot per interval, got {received}"
        );
    }
}
