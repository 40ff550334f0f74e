use crate::{
    AtomicSequencer, LockSequencer, MAX_ATOMIC_MILLIS, MAX_SEQUENCE, MonotonicClock, Poll,
    Sequencer, Stamp, TimeSource,
};
use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::scope,
};

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// Replays a fixed list of readings; `index` is advanced by the test.
#[derive(Clone)]
struct SharedMockStepTime {
    clock: Arc<MockStepTime>,
}

struct MockStepTime {
    values: Vec<u64>,
    index: AtomicUsize,
}

impl SharedMockStepTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            clock: Arc::new(MockStepTime {
                values,
                index: AtomicUsize::new(0),
            }),
        }
    }

    fn step(&self) {
        self.clock.index.fetch_add(1, Ordering::SeqCst);
    }
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.load(Ordering::SeqCst)]
    }
}

trait PollExt {
    fn unwrap_ready(self) -> Stamp;
    fn unwrap_pending(self) -> u64;
}

impl PollExt for Poll {
    fn unwrap_ready(self) -> Stamp {
        match self {
            Self::Ready { stamp } => stamp,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { stamp } => panic!("unexpected ready ({stamp:?})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn run_sequence_increments_within_same_tick<S: Sequencer>(sequencer: &S) {
    let s1 = sequencer.try_poll().unwrap().unwrap_ready();
    let s2 = sequencer.try_poll().unwrap().unwrap_ready();
    let s3 = sequencer.try_poll().unwrap().unwrap_ready();

    assert_eq!(s1, Stamp::new(42, 0));
    assert_eq!(s2, Stamp::new(42, 1));
    assert_eq!(s3, Stamp::new(42, 2));
    assert!(s1 < s2 && s2 < s3);
}

fn run_pending_when_sequence_exhausted<S: Sequencer>(sequencer: &S) {
    let yield_for = sequencer.try_poll().unwrap().unwrap_pending();
    assert_eq!(yield_for, 1);
}

fn run_handles_rollover<S: Sequencer>(sequencer: &S, time: &SharedMockStepTime) {
    for i in 0..=MAX_SEQUENCE {
        let stamp = sequencer.try_poll().unwrap().unwrap_ready();
        assert_eq!(stamp, Stamp::new(42, i));
    }

    assert_eq!(sequencer.try_poll().unwrap().unwrap_pending(), 1);

    time.step();

    let stamp = sequencer.try_poll().unwrap().unwrap_ready();
    assert_eq!(stamp, Stamp::new(43, 0));
}

fn run_clock_regression_holds_timestamp<S: Sequencer>(sequencer: &S, time: &SharedMockStepTime) {
    let first = sequencer.try_poll().unwrap().unwrap_ready();
    assert_eq!(first, Stamp::new(100, 0));

    // Clock steps back to 90: keep issuing against 100.
    time.step();
    let second = sequencer.try_poll().unwrap().unwrap_ready();
    let third = sequencer.try_poll().unwrap().unwrap_ready();
    assert_eq!(second, Stamp::new(100, 1));
    assert_eq!(third, Stamp::new(100, 2));

    // Clock reaches 101: regular rollover resumes.
    time.step();
    let fourth = sequencer.try_poll().unwrap().unwrap_ready();
    assert_eq!(fourth, Stamp::new(101, 0));
}

fn run_exhausted_while_clock_behind_waits<S: Sequencer>(sequencer: &S, time: &SharedMockStepTime) {
    // Last issued (100, 999); clock reads 97.
    assert_eq!(sequencer.try_poll().unwrap().unwrap_pending(), 4);
    time.step();
    // Clock reads 100: still exhausted.
    assert_eq!(sequencer.try_poll().unwrap().unwrap_pending(), 1);
    time.step();
    assert_eq!(
        sequencer.try_poll().unwrap().unwrap_ready(),
        Stamp::new(101, 0)
    );
}

fn run_monotonic<S: Sequencer>(sequencer: &S) {
    const TOTAL_STAMPS: usize = 1_000 * 256;

    let mut last = sequencer.try_next().unwrap();
    for _ in 0..TOTAL_STAMPS {
        let stamp = sequencer.try_next().unwrap();
        assert!(stamp > last, "{stamp:?} <= {last:?}");
        if stamp.millis > last.millis {
            assert_eq!(stamp.sequence, 0);
        } else {
            assert_eq!(stamp.sequence, last.sequence + 1);
        }
        assert!(stamp.sequence <= MAX_SEQUENCE);
        last = stamp;
    }
}

fn run_monotonic_threaded<S>(sequencer: S)
where
    S: Sequencer + Send + Sync,
{
    const THREADS: usize = 8;
    const TOTAL_STAMPS: usize = 1_000 * 256;
    const STAMPS_PER_THREAD: usize = TOTAL_STAMPS / THREADS;

    let seen = Mutex::new(HashSet::with_capacity(TOTAL_STAMPS));

    scope(|s| {
        for _ in 0..THREADS {
            let sequencer = &sequencer;
            let seen = &seen;
            s.spawn(move || {
                let mut last = Stamp::default();
                let mut local = Vec::with_capacity(STAMPS_PER_THREAD);
                for _ in 0..STAMPS_PER_THREAD {
                    let stamp = sequencer.try_next().unwrap();
                    // Program order within a thread is also completion order.
                    assert!(stamp > last);
                    last = stamp;
                    local.push(stamp);
                }
                let mut seen = seen.lock().unwrap();
                for stamp in local {
                    assert!(seen.insert(stamp), "duplicate stamp {stamp:?}");
                }
            });
        }
    });

    let final_count = seen.lock().unwrap().len();
    assert_eq!(final_count, TOTAL_STAMPS, "Expected {TOTAL_STAMPS} unique stamps");
}

#[test]
fn lock_sequencer_sequence_test() {
    let sequencer = LockSequencer::new(MockTime { millis: 42 });
    run_sequence_increments_within_same_tick(&sequencer);
}

#[test]
fn atomic_sequencer_sequence_test() {
    let sequencer = AtomicSequencer::new(MockTime { millis: 42 });
    run_sequence_increments_within_same_tick(&sequencer);
}

#[test]
fn lock_sequencer_pending_test() {
    let sequencer =
        LockSequencer::from_stamp(Stamp::new(42, MAX_SEQUENCE), MockTime { millis: 42 });
    run_pending_when_sequence_exhausted(&sequencer);
}

#[test]
fn atomic_sequencer_pending_test() {
    let sequencer =
        AtomicSequencer::from_stamp(Stamp::new(42, MAX_SEQUENCE), MockTime { millis: 42 });
    run_pending_when_sequence_exhausted(&sequencer);
}

#[test]
fn atomic_sequencer_clamps_out_of_range_stamps() {
    let sequencer =
        AtomicSequencer::from_stamp(Stamp::new(u64::MAX, 5), MockTime { millis: u64::MAX });
    assert_eq!(
        sequencer.try_poll().unwrap().unwrap_ready(),
        Stamp::new(MAX_ATOMIC_MILLIS, 6)
    );

    let sequencer =
        AtomicSequencer::from_stamp(Stamp::new(42, u16::MAX), MockTime { millis: 42 });
    sequencer.try_poll().unwrap().unwrap_pending();
}

#[test]
fn lock_sequencer_rollover_test() {
    let time = SharedMockStepTime::new(vec![42, 43]);
    let sequencer = LockSequencer::new(time.clone());
    run_handles_rollover(&sequencer, &time);
}

#[test]
fn atomic_sequencer_rollover_test() {
    let time = SharedMockStepTime::new(vec![42, 43]);
    let sequencer = AtomicSequencer::new(time.clone());
    run_handles_rollover(&sequencer, &time);
}

#[test]
fn lock_sequencer_clock_regression_test() {
    let time = SharedMockStepTime::new(vec![100, 90, 101]);
    let sequencer = LockSequencer::new(time.clone());
    run_clock_regression_holds_timestamp(&sequencer, &time);
}

#[test]
fn atomic_sequencer_clock_regression_test() {
    let time = SharedMockStepTime::new(vec![100, 90, 101]);
    let sequencer = AtomicSequencer::new(time.clone());
    run_clock_regression_holds_timestamp(&sequencer, &time);
}

#[test]
fn lock_sequencer_exhausted_behind_test() {
    let time = SharedMockStepTime::new(vec![97, 100, 101]);
    let sequencer = LockSequencer::from_stamp(Stamp::new(100, MAX_SEQUENCE), time.clone());
    run_exhausted_while_clock_behind_waits(&sequencer, &time);
}

#[test]
fn atomic_sequencer_exhausted_behind_test() {
    let time = SharedMockStepTime::new(vec![97, 100, 101]);
    let sequencer = AtomicSequencer::from_stamp(Stamp::new(100, MAX_SEQUENCE), time.clone());
    run_exhausted_while_clock_behind_waits(&sequencer, &time);
}

#[test]
fn lock_sequencer_monotonic_clock_sequence_increments() {
    run_monotonic(&LockSequencer::new(MonotonicClock::new()));
}

#[test]
fn atomic_sequencer_monotonic_clock_sequence_increments() {
    run_monotonic(&AtomicSequencer::new(MonotonicClock::new()));
}

#[test]
fn lock_sequencer_threaded_monotonic() {
    run_monotonic_threaded(LockSequencer::new(MonotonicClock::new()));
}

#[test]
fn atomic_sequencer_threaded_monotonic() {
    run_monotonic_threaded(AtomicSequencer::new(MonotonicClock::new()));
}

#[test]
fn stamps_order_by_millis_then_sequence() {
    assert!(Stamp::new(1, 999) < Stamp::new(2, 0));
    assert!(Stamp::new(2, 0) < Stamp::new(2, 1));
}
