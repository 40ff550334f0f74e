use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread::{scope, sleep},
    time::Duration,
};

use stampid::{Error, JavaHashPartitioner, KeyPartitioner, PartitionConstraint, Reject, global};

const NODE: u64 = 23;

#[test]
fn parse_failure() {
    assert!(global::parse("").is_none());
    assert!(global::parse("TEST").is_none());
    assert!(global::parse("XCL983dfb1ee0a847cd9e7321fcabc2f223").is_none());
    assert!(global::parse("XCL98-3df-b1e:e0a847cd9e7321fcabc2f223").is_none());
    assert!(global::parse("ABC2032250959030643972247").is_none());
    assert!(global::parse("ABC2011450959030643972247").is_none());
    assert!(global::parse("ABC2011259659030643972247").is_none());
    assert!(global::parse("ABC2011250972030643972247").is_none());
    assert!(global::parse("ABC2011250959720643972247").is_none());
}

#[test]
fn parse_success() {
    let text = "ABC2011250959030643972247";
    let id = global::parse(text).unwrap();
    assert_eq!(id.as_str(), text);
    assert_eq!(id.sequence(), 247);
    assert_eq!(id.node().get(), 3972);
    assert_eq!(id.generated_at().timestamp_millis(), 1_606_298_343_064);
}

#[test]
fn parse_success_after_generation() {
    global::initialize(NODE);
    let generated = global::generate("TEST123").unwrap();
    let parsed = global::parse(generated.as_str()).unwrap();
    assert_eq!(parsed, generated);
}

#[test]
fn constraint_failure() {
    global::initialize(NODE);
    assert_eq!(
        global::generate_with_constraints("TST", &[&Reject], false),
        Ok(None)
    );
}

#[test]
fn empty_prefix() {
    global::initialize(NODE);
    assert_eq!(global::generate(""), Err(Error::EmptyPrefix));
}

#[test]
fn reinitialization_is_ignored() {
    let node = global::initialize(NODE);
    assert_eq!(global::initialize(NODE + 1), node);
    assert_eq!(global::generator().node(), Ok(node));
}

/// Twenty callers generate continuously for ten seconds. Every identifier must
/// parse back to an equal record and no two may share a stamp.
#[test]
fn sustained_concurrent_generation() {
    const CALLERS: usize = 20;
    const DURATION: Duration = Duration::from_secs(10);

    global::initialize(NODE);
    let stop = AtomicBool::new(false);

    let mut keys: Vec<u64> = scope(|s| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                s.spawn(|| {
                    let mut keys = Vec::new();
                    while !stop.load(Ordering::Relaxed) {
                        let id = global::generate("X").unwrap();
                        assert_eq!(global::parse(id.as_str()).as_ref(), Some(&id));
                        let millis = u64::try_from(id.generated_at().timestamp_millis()).unwrap();
                        keys.push(millis * 1_000 + u64::from(id.sequence()));
                    }
                    keys
                })
            })
            .collect();

        sleep(DURATION);
        stop.store(true, Ordering::Relaxed);
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let total = keys.len();
    assert!(total > 0);
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), total, "duplicate identifiers generated");
}

#[test]
fn partitioned_concurrent_generation() {
    const CALLERS: usize = 20;
    const PER_CALLER: usize = 200;

    global::initialize(NODE);
    let partitioner = JavaHashPartitioner::new(16).unwrap();
    let constraint = PartitionConstraint::new(4, partitioner).unwrap();

    scope(|s| {
        for _ in 0..CALLERS {
            s.spawn(|| {
                for _ in 0..PER_CALLER {
                    let id = global::generate_with_constraints("X", &[&constraint], true)
                        .unwrap()
                        .unwrap();
                    assert_eq!(partitioner.partition(id.as_str()), 4);
                }
            });
        }
    });
}
