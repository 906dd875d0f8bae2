//! Single-slot store holding the latest SWR snapshot.
//!
//! One [`SnapshotWriter`] belongs to the sampler; any number of
//! [`SnapshotReader`]s may be cloned out to request handlers. The slot is a
//! `tokio::sync::watch` channel: publishing replaces the value, reading
//! copies it out under a short read lock, so a reader always gets one whole
//! snapshot and never blocks the writer for longer than that copy.

use crate::meter::data::SwrSnapshot;
use tokio::sync::watch;

/// The value held in the slot: a snapshot and the tick that produced it.
#[derive(Debug, Clone, Copy)]
struct Slot {
    /// 0 until the first publish
    tick: u64,
    snapshot: SwrSnapshot,
}

/// Create a store seeded with the default (no data yet) snapshot.
pub fn snapshot_store() -> (SnapshotWriter, SnapshotReader) {
    let (tx, rx) = watch::channel(Slot {
        tick: 0,
        snapshot: SwrSnapshot::default(),
    });
    (SnapshotWriter { tx, tick: 0 }, SnapshotReader { rx })
}

/// Write half of the store. Not `Clone`: there is exactly one writer.
#[derive(Debug)]
pub struct SnapshotWriter {
    tx: watch::Sender<Slot>,
    tick: u64,
}

impl SnapshotWriter {
    /// Replace the current snapshot.
    ///
    /// Succeeds even when every reader has been dropped.
    pub fn publish(&mut self, snapshot: SwrSnapshot) {
        self.tick += 1;
        self.tx.send_replace(Slot {
            tick: self.tick,
            snapshot,
        });
    }

    /// Number of snapshots published so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Create another reader for this store.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read half of the store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Slot>,
}

impl SnapshotReader {
    /// Return the most recently published snapshot.
    pub fn read(&self) -> SwrSnapshot {
        self.rx.borrow().snapshot
    }

    /// Return the latest snapshot together with its tick number.
    pub fn read_with_tick(&self) -> (u64, SwrSnapshot) {
        let slot = *self.rx.borrow();
        (slot.tick, slot.snapshot)
    }

    /// Whether the sampler has published at least one snapshot.
    pub fn has_published(&self) -> bool {
        self.rx.borrow().tick > 0
    }

    /// Wait for the next published snapshot and return it.
    ///
    /// Returns `None` once the writer has been dropped.
    pub async fn changed(&mut self) -> Option<SwrSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn uniform_snapshot(value: f64) -> SwrSnapshot {
        SwrSnapshot {
            forward_power: value,
            reverse_power: value,
            swr: value,
            reflection_coefficient: value,
            power_loss_percent: value,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_default_before_first_publish() {
        let (writer, reader) = snapshot_store();
        assert!(!reader.has_published());
        assert_eq!(writer.ticks(), 0);

        let snapshot = reader.read();
        assert_eq!(snapshot.swr, 1.0);
        assert_eq!(snapshot.forward_power, 0.0);
        assert_eq!(snapshot.reverse_power, 0.0);
    }

    #[test]
    fn test_publish_replaces_previous() {
        let (mut writer, reader) = snapshot_store();
        writer.publish(uniform_snapshot(1.0));
        writer.publish(uniform_snapshot(2.0));

        assert!(reader.has_published());
        let (tick, snapshot) = reader.read_with_tick();
        assert_eq!(tick, 2);
        assert_eq!(snapshot.swr, 2.0);
    }

    #[test]
    fn test_publish_without_readers() {
        let (mut writer, reader) = snapshot_store();
        drop(reader);
        writer.publish(uniform_snapshot(3.0));
        assert_eq!(writer.reader().read().swr, 3.0);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_snapshots() {
        const READERS: usize = 8;
        const TICKS: u64 = 5_000;

        let (mut writer, reader) = snapshot_store();
        let done = Arc::new(AtomicBool::new(false));

        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let reader = reader.clone();
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut last_tick = 0;
                    let mut reads = 0u64;
                    loop {
                        let finished = done.load(Ordering::Acquire);
                        let (tick, snapshot) = reader.read_with_tick();
                        if tick > 0 {
                            let value = snapshot.forward_power;
                            assert_eq!(value, tick as f64);
                            assert_eq!(snapshot.reverse_power, value);
                            assert_eq!(snapshot.swr, value);
                            assert_eq!(snapshot.reflection_coefficient, value);
                            assert_eq!(snapshot.power_loss_percent, value);
                        }
                        assert!(tick >= last_tick, "tick went backwards");
                        last_tick = tick;
                        reads += 1;
                        if finished {
                            break;
                        }
                    }
                    reads
                })
            })
            .collect();

        for tick in 1..=TICKS {
            writer.publish(uniform_snapshot(tick as f64));
        }
        done.store(true, Ordering::Release);

        for handle in handles {
            assert!(handle.join().unwrap() > 0);
        }
        assert_eq!(reader.read().swr, TICKS as f64);
    }

    #[tokio::test]
    async fn test_changed_wakes_on_publish() {
        let (mut writer, mut reader) = snapshot_store();

        let waiter = tokio::spawn(async move { reader.changed().await });
        tokio::task::yield_now().await;
        writer.publish(uniform_snapshot(4.0));

        let snapshot = waiter.await.unwrap().expect("writer still alive");
        assert_eq!(snapshot.swr, 4.0);
    }

    #[tokio::test]
    async fn test_changed_ends_when_writer_dropped() {
        let (writer, mut reader) = snapshot_store();
        drop(writer);
        assert!(reader.changed().await.is_none());
    }
}
