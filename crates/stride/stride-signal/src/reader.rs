//! Lazy, cooldown-limited reader of the shared velocity signal.
//!
//! # States
//!
//! ```text
//!            read(), cooldown elapsed
//!   ┌──────────────┐  connect ok   ┌───────────┐
//!   │ Disconnected │ ────────────▶ │ Connected │
//!   └──────────────┘               └───────────┘
//!          ▲   │ connect failed          │
//!          │   └─▶ (stay, stamp attempt)  │ disconnect()
//!          └──────────────────────────────┘
//! ```
//!
//! Every attempt is stamped whether it succeeds or not, so a missing
//! producer costs at most one open per `retry_interval`. A producer that
//! never started and one that went away look the same: both read as 0.0.

use crate::region::{RegionConnector, SignalRegion};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What the interception path needs from a signal: a non-failing read plus
/// connection lifecycle hooks.
pub trait SignalSource: Send + Sync {
    /// Current signal, 0.0 when there is none. Never fails.
    fn read(&self) -> f32;

    /// Best-effort connection attempt, subject to the same cooldown as
    /// `read`. Returns whether a region is mapped afterwards.
    fn prime(&self) -> bool;

    /// Drops the mapping. The next `read` starts the reconnect cycle over.
    fn disconnect(&self);
}

struct ReaderState<R> {
    region: Option<R>,
    last_attempt: Option<Instant>,
    last_value: f32,
    attempts: u64,
}

pub struct SignalReader<C: RegionConnector> {
    connector: C,
    retry_interval: Duration,
    /// Region and attempt stamp are swapped together under this lock, so a
    /// reader never sees a half-published connection.
    state: Mutex<ReaderState<C::Region>>,
}

impl<C: RegionConnector> SignalReader<C> {
    pub fn new(connector: C, retry_interval: Duration) -> Self {
        Self {
            connector,
            retry_interval,
            state: Mutex::new(ReaderState {
                region: None,
                last_attempt: None,
                last_value: 0.0,
                attempts: 0,
            }),
        }
    }

    /// `read` against an explicit clock reading.
    pub fn read_at(&self, now: Instant) -> f32 {
        let mut state = self.state.lock();
        if state.region.is_none() {
            self.try_connect(&mut state, now);
        }

        let value = match state.region.as_ref() {
            Some(region) => region.load().signal(),
            None => 0.0,
        };
        state.last_value = value;
        value
    }

    /// `prime` against an explicit clock reading.
    pub fn prime_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock();
        if state.region.is_none() {
            self.try_connect(&mut state, now);
        }
        state.region.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().region.is_some()
    }

    /// The value the most recent `read` returned.
    pub fn last_value(&self) -> f32 {
        self.state.lock().last_value
    }

    /// Number of connection attempts actually made so far.
    pub fn attempts(&self) -> u64 {
        self.state.lock().attempts
    }

    fn try_connect(&self, state: &mut ReaderState<C::Region>, now: Instant) {
        if let Some(last) = state.last_attempt {
            if now.saturating_duration_since(last) < self.retry_interval {
                return;
            }
        }

        state.last_attempt = Some(now);
        state.attempts += 1;

        match self.connector.connect() {
            Ok(region) => {
                info!(region = %self.connector.describe(), "signal region mapped");
                state.region = Some(region);
            }
            Err(err) => {
                debug!(
                    region = %self.connector.describe(),
                    error = %err,
                    retry_ms = self.retry_interval.as_millis() as u64,
                    "signal region not available"
                );
            }
        }
    }
}

impl<C: RegionConnector> SignalSource for SignalReader<C> {
    fn read(&self) -> f32 {
        self.read_at(Instant::now())
    }

    fn prime(&self) -> bool {
        self.prime_at(Instant::now())
    }

    fn disconnect(&self) {
        let region = self.state.lock().region.take();
        if region.is_some() {
            info!(region = %self.connector.describe(), "signal region unmapped");
        }
        drop(region);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shm_layout::SignalRecord;
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    const RETRY: Duration = Duration::from_millis(2000);

    /// Producer stand-in: a shared record plus an on/off switch for
    /// whether the region can currently be opened.
    #[derive(Clone, Default)]
    struct FakeProducer {
        record: Arc<Mutex<SignalRecord>>,
        available: Arc<AtomicBool>,
        opens: Arc<AtomicU64>,
    }

    struct FakeRegion {
        record: Arc<Mutex<SignalRecord>>,
    }

    impl SignalRegion for FakeRegion {
        fn load(&self) -> SignalRecord {
            *self.record.lock()
        }
    }

    impl RegionConnector for FakeProducer {
        type Region = FakeRegion;

        fn connect(&self) -> io::Result<FakeRegion> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.available.load(Ordering::SeqCst) {
                Ok(FakeRegion {
                    record: self.record.clone(),
                })
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        }

        fn describe(&self) -> String {
            "fake".into()
        }
    }

    impl FakeProducer {
        fn start(&self, record: SignalRecord) {
            *self.record.lock() = record;
            self.available.store(true, Ordering::SeqCst);
        }

        fn opens(&self) -> u64 {
            self.opens.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn absent_producer_reads_zero() {
        let producer = FakeProducer::default();
        let reader = SignalReader::new(producer.clone(), RETRY);

        assert_eq!(reader.read_at(Instant::now()), 0.0);
        assert!(!reader.is_connected());
        assert_eq!(producer.opens(), 1);
    }

    #[test]
    fn failed_attempts_inside_cooldown_open_once() {
        let producer = FakeProducer::default();
        let reader = SignalReader::new(producer.clone(), RETRY);
        let t0 = Instant::now();

        reader.read_at(t0);
        reader.read_at(t0 + Duration::from_millis(1999));
        assert_eq!(producer.opens(), 1);
        assert_eq!(reader.attempts(), 1);
    }

    #[test]
    fn failed_attempts_past_cooldown_both_open() {
        let producer = FakeProducer::default();
        let reader = SignalReader::new(producer.clone(), RETRY);
        let t0 = Instant::now();

        reader.read_at(t0);
        reader.read_at(t0 + RETRY);
        assert_eq!(producer.opens(), 2);
    }

    #[test]
    fn late_producer_is_picked_up_after_cooldown() {
        let producer = FakeProducer::default();
        let reader = SignalReader::new(producer.clone(), RETRY);
        let t0 = Instant::now();

        assert_eq!(reader.read_at(t0), 0.0);

        producer.start(SignalRecord::live(0.4));
        assert_eq!(reader.read_at(t0 + Duration::from_millis(500)), 0.0);
        assert_eq!(reader.read_at(t0 + Duration::from_millis(2500)), 0.4);
        assert!(reader.is_connected());
        assert_eq!(reader.last_value(), 0.4);
    }

    #[test]
    fn paused_producer_reads_zero_but_stays_mapped() {
        let producer = FakeProducer::default();
        producer.start(SignalRecord::paused(0.9));
        let reader = SignalReader::new(producer.clone(), RETRY);
        let t0 = Instant::now();

        assert_eq!(reader.read_at(t0), 0.0);
        assert!(reader.is_connected());

        *producer.record.lock() = SignalRecord::live(0.9);
        assert_eq!(reader.read_at(t0), 0.9);
        assert_eq!(producer.opens(), 1);
    }

    #[test]
    fn live_velocity_is_returned_verbatim() {
        let producer = FakeProducer::default();
        producer.start(SignalRecord::live(1.75));
        let reader = SignalReader::new(producer, RETRY);

        assert_eq!(reader.read_at(Instant::now()), 1.75);
    }

    #[test]
    fn disconnect_restarts_lazy_cycle() {
        let producer = FakeProducer::default();
        producer.start(SignalRecord::live(0.5));
        let reader = SignalReader::new(producer.clone(), RETRY);
        let t0 = Instant::now();

        assert!(reader.prime_at(t0));
        reader.disconnect();
        assert!(!reader.is_connected());

        // still inside the cooldown of the successful attempt
        assert_eq!(reader.read_at(t0 + Duration::from_millis(10)), 0.0);
        assert_eq!(reader.read_at(t0 + RETRY), 0.5);
        assert_eq!(producer.opens(), 2);
    }

    #[test]
    fn concurrent_readers_never_double_map() {
        let producer = FakeProducer::default();
        producer.start(SignalRecord::live(0.3));
        let reader = Arc::new(SignalReader::new(producer.clone(), RETRY));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reader = reader.clone();
                std::thread::spawn(move || {
                    (0..1000).map(|_| reader.read()).all(|v| v == 0.3)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(producer.opens(), 1);
    }
}
