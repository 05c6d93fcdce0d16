/*!
 * Invariant Tests
 * Serialized execution under a mixed fork/exec/wait/signal workload
 */

use super::common::{scheduler, Recorder};
use coop_sched::{Scheduler, ThreadStatus};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Probe shared by every handler in the workload
#[derive(Clone)]
struct Probe {
    sched: Scheduler,
    inside: Arc<AtomicUsize>,
    violations: Recorder<String>,
}

impl Probe {
    /// Assert serialized execution for one slice of handler work
    fn slice(&self, who: &str) {
        let concurrent = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
        if concurrent != 1 {
            self.violations
                .push(format!("{}: {} handlers inside at once", who, concurrent));
        }

        let running = self.sched.count_with_status(ThreadStatus::Running);
        if running != 1 {
            self.violations
                .push(format!("{}: {} threads RUNNING", who, running));
        }
        match self.sched.current().and_then(|tid| self.sched.status(tid)) {
            Some(ThreadStatus::Running) => {}
            other => self
                .violations
                .push(format!("{}: current has status {:?}", who, other)),
        }

        self.inside.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn test_at_most_one_thread_runs() {
    let sched = scheduler(2, 2);
    let probe = Probe {
        sched: sched.clone(),
        inside: Arc::new(AtomicUsize::new(0)),
        violations: Recorder::new(),
    };

    let root = probe.clone();
    sched
        .fork(
            move |_| {
                // Waiter and signaler pair on device 0
                let waiter = root.clone();
                root.sched
                    .fork(
                        move |_| {
                            for _ in 0..3 {
                                waiter.slice("waiter");
                                let _ = waiter.sched.wait(0);
                                waiter.slice("waiter resumed");
                            }
                        },
                        3,
                    )
                    .unwrap();

                for (index, priority) in [1u8, 2, 2, 4].into_iter().enumerate() {
                    let worker = root.clone();
                    root.sched
                        .fork(
                            move |_| {
                                let name = format!("worker{}", index);
                                for _ in 0..5 {
                                    worker.slice(&name);
                                    worker.sched.exec();
                                }
                                let _ = worker.sched.signal(0);
                                worker.slice(&name);
                            },
                            priority,
                        )
                        .unwrap();
                    root.slice("root");
                }
            },
            2,
        )
        .unwrap();

    sched.shutdown();
    assert_eq!(probe.violations.snapshot(), Vec::<String>::new());

    let stats = sched.stats();
    assert_eq!(stats.forks, 6);
    assert_eq!(stats.terminated, 6);
    assert_eq!(stats.live_threads, 0);
}

#[test]
fn test_waiting_tag_stays_in_range() {
    let sched = scheduler(3, 3);
    let tags: Recorder<Option<u32>> = Recorder::new();

    let s = sched.clone();
    let t = tags.clone();
    sched
        .fork(
            move |_| {
                let mut waiters = Vec::new();
                for device in 0..3u32 {
                    let waiter = s.clone();
                    waiters.push(
                        s.fork(
                            move |_| {
                                let _ = waiter.wait(device);
                            },
                            4,
                        )
                        .unwrap(),
                    );
                }

                // The third fork exhausted the root's quantum, so every waiter blocked
                s.signal(0).unwrap();
                for &tid in &waiters {
                    t.push(s.waiting_on(tid));
                }
                s.signal(1).unwrap();
                s.signal(2).unwrap();
            },
            0,
        )
        .unwrap();

    sched.shutdown();
    // Device 0 was already signaled and its waiter terminated
    assert_eq!(tags.snapshot(), vec![None, Some(1), Some(2)]);
}
