/*!
 * Device I/O Tests
 * wait/signal handshake, contract violations and deadlock detection
 */

use super::common::{scheduler, EventLog, Recorder};
use coop_sched::{SignalError, ThreadStatus, Tid, WaitError};
use pretty_assertions::assert_eq;
use std::sync::mpsc;

#[test]
fn test_signal_releases_waiter() {
    let sched = scheduler(2, 2);
    let log = EventLog::new();

    let s = sched.clone();
    let l = log.clone();
    sched
        .fork(
            move |_| {
                let signaler = s.clone();
                let high_log = l.clone();
                s.fork(
                    move |_| {
                        let woken = signaler.signal(0).unwrap();
                        high_log.push(format!("high signaled {}", woken));
                    },
                    2,
                )
                .unwrap();

                s.wait(0).unwrap();
                l.push("low resumed");
            },
            1,
        )
        .unwrap();

    sched.shutdown();
    assert_eq!(log.snapshot(), vec!["high signaled 1", "low resumed"]);

    let stats = sched.stats();
    assert_eq!(stats.forks, 2);
    assert_eq!(stats.waits, 1);
    assert_eq!(stats.signals, 1);
    assert_eq!(stats.woken, 1);
    assert_eq!(stats.terminated, 2);
    assert_eq!(stats.live_threads, 0);
    assert_eq!(stats.deadlocks, 0);
}

#[test]
fn test_signal_only_touches_matching_device() {
    let sched = scheduler(10, 2);
    let log = EventLog::new();
    let tids: Recorder<Tid> = Recorder::new();

    let s = sched.clone();
    let l = log.clone();
    let t = tids.clone();
    sched
        .fork(
            move |_| {
                for device in [0u32, 1] {
                    let waiter = s.clone();
                    let l = l.clone();
                    let tid = s
                        .fork(
                            move |_| {
                                waiter.wait(device).unwrap();
                                l.push(format!("w{} resumed", device));
                            },
                            1,
                        )
                        .unwrap();
                    t.push(tid);
                }

                let signaler = s.clone();
                let l = l.clone();
                let t = t.clone();
                s.fork(
                    move |_| {
                        let waiters = t.snapshot();
                        let woken = signaler.signal(0).unwrap();
                        l.push(format!("woke {} on 0", woken));
                        l.push(format!("w1 on {:?}", signaler.waiting_on(waiters[1])));
                        l.push(format!("w1 {}", signaler.status(waiters[1]).unwrap()));

                        let woken = signaler.signal(1).unwrap();
                        l.push(format!("woke {} on 1", woken));
                    },
                    0,
                )
                .unwrap();
            },
            1,
        )
        .unwrap();

    sched.shutdown();
    assert_eq!(
        log.snapshot(),
        vec![
            "w0 resumed",
            "woke 1 on 0",
            "w1 on Some(1)",
            "w1 waiting",
            "w1 resumed",
            "woke 1 on 1",
        ]
    );
}

#[test]
fn test_signal_broadcasts_to_all_waiters() {
    let sched = scheduler(3, 1);
    let log = EventLog::new();

    let s = sched.clone();
    let l = log.clone();
    sched
        .fork(
            move |_| {
                for name in ["w1", "w2", "w3"] {
                    let waiter = s.clone();
                    let l = l.clone();
                    s.fork(
                        move |_| {
                            waiter.wait(0).unwrap();
                            l.push(name);
                        },
                        3,
                    )
                    .unwrap();
                }

                // The third fork exhausted the root's quantum, so every waiter blocked
                let woken = s.signal(0).unwrap();
                l.push(format!("root woke {}", woken));
            },
            0,
        )
        .unwrap();

    sched.shutdown();
    assert_eq!(log.snapshot(), vec!["w1", "w2", "w3", "root woke 3"]);
}

#[test]
fn test_wait_rejects_out_of_range_device() {
    let sched = scheduler(2, 2);
    let results: Recorder<Result<(), WaitError>> = Recorder::new();
    let statuses: Recorder<usize> = Recorder::new();

    let s = sched.clone();
    let r = results.clone();
    let st = statuses.clone();
    sched
        .fork(
            move |_| {
                r.push(s.wait(2));
                r.push(s.wait(u32::MAX));
                st.push(s.count_with_status(ThreadStatus::Running));
                st.push(s.count_with_status(ThreadStatus::Waiting));
                st.push(s.queue_len());
            },
            1,
        )
        .unwrap();

    sched.shutdown();
    assert_eq!(
        results.snapshot(),
        vec![
            Err(WaitError::InvalidDevice {
                device: 2,
                max_io: 2
            }),
            Err(WaitError::InvalidDevice {
                device: u32::MAX,
                max_io: 2
            }),
        ]
    );
    assert_eq!(statuses.snapshot(), vec![1, 0, 0]);
    assert_eq!(sched.stats().waits, 0);
}

#[test]
fn test_signal_rejects_out_of_range_device() {
    let sched = scheduler(2, 1);
    let results: Recorder<Result<usize, SignalError>> = Recorder::new();

    let s = sched.clone();
    let r = results.clone();
    sched.fork(move |_| r.push(s.signal(1)), 1).unwrap();

    sched.shutdown();
    assert_eq!(
        results.snapshot(),
        vec![Err(SignalError::InvalidDevice {
            device: 1,
            max_io: 1
        })]
    );
    assert_eq!(sched.stats().signals, 0);
}

#[test]
fn test_zero_devices_rejects_every_id() {
    let sched = scheduler(1, 0);
    let results: Recorder<Result<(), WaitError>> = Recorder::new();

    let s = sched.clone();
    let r = results.clone();
    sched.fork(move |_| r.push(s.wait(0)), 0).unwrap();

    sched.shutdown();
    assert_eq!(
        results.snapshot(),
        vec![Err(WaitError::InvalidDevice {
            device: 0,
            max_io: 0
        })]
    );
}

#[test]
fn test_wait_and_signal_without_running_thread() {
    let sched = scheduler(2, 2);

    assert_eq!(sched.wait(0), Err(WaitError::NoCurrentThread));
    assert_eq!(sched.signal(0), Err(SignalError::NoCurrentThread));

    sched.shutdown();
    assert_eq!(sched.wait(0), Err(WaitError::NoCurrentThread));
}

#[test]
fn test_wait_and_signal_from_foreign_thread() {
    let sched = scheduler(2, 2);
    let (ready_tx, ready_rx) = mpsc::channel();
    let (go_tx, go_rx) = mpsc::channel::<()>();

    sched
        .fork(
            move |_| {
                ready_tx.send(()).unwrap();
                go_rx.recv().unwrap();
            },
            1,
        )
        .unwrap();

    ready_rx.recv().unwrap();
    assert_eq!(sched.wait(0), Err(WaitError::NotCurrentThread));
    assert_eq!(sched.signal(0), Err(SignalError::NotCurrentThread));
    assert_eq!(sched.count_with_status(ThreadStatus::Running), 1);
    go_tx.send(()).unwrap();

    sched.shutdown();
}

#[test]
fn test_lone_waiter_deadlock_leaves_state_unchanged() {
    let sched = scheduler(2, 1);
    let results: Recorder<Result<(), WaitError>> = Recorder::new();
    let statuses: Recorder<Option<ThreadStatus>> = Recorder::new();
    let devices: Recorder<Option<u32>> = Recorder::new();

    let s = sched.clone();
    let r = results.clone();
    let st = statuses.clone();
    let d = devices.clone();
    sched
        .fork(
            move |_| {
                r.push(s.wait(0));
                let me = s.current().unwrap();
                st.push(s.status(me));
                d.push(s.waiting_on(me));
            },
            3,
        )
        .unwrap();

    sched.shutdown();
    assert_eq!(results.snapshot(), vec![Err(WaitError::Deadlock)]);
    assert_eq!(statuses.snapshot(), vec![Some(ThreadStatus::Running)]);
    assert_eq!(devices.snapshot(), vec![None]);
    assert_eq!(sched.stats().deadlocks, 1);
}

#[test]
fn test_all_threads_waiting_surfaces_deadlock() {
    let sched = scheduler(4, 1);
    let results: Recorder<(&'static str, Result<(), WaitError>)> = Recorder::new();

    let s = sched.clone();
    let r = results.clone();
    sched
        .fork(
            move |_| {
                let other = s.clone();
                let other_results = r.clone();
                s.fork(move |_| other_results.push(("b", other.wait(0))), 1)
                    .unwrap();
                r.push(("a", s.wait(0)));
            },
            1,
        )
        .unwrap();

    // Must return rather than hang on the orphaned waiter
    sched.shutdown();
    assert_eq!(
        results.snapshot(),
        vec![
            ("b", Err(WaitError::Deadlock)),
            ("a", Err(WaitError::Deadlock))
        ]
    );

    let stats = sched.stats();
    assert_eq!(stats.deadlocks, 2);
    assert_eq!(stats.terminated, 2);
}
