//! Concurrency bound tests.
//!
//! At most `concurrency` tasks may be started-but-not-settled at any time,
//! and capacity freed by a finished task goes to the next queued item.

use presto::testing::SlowTask;
use presto::{FnTask, Scheduler, SchedulerConfig, Task, TaskError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::common::wait_until;

/// Task that tracks how many copies of itself run simultaneously.
fn gauge_task(
    current: &Arc<AtomicU32>,
    max_seen: &Arc<AtomicU32>,
    done: &Arc<AtomicU32>,
    duration: Duration,
) -> Arc<dyn Task> {
    let current = Arc::clone(current);
    let max_seen = Arc::clone(max_seen);
    let done = Arc::clone(done);
    Arc::new(FnTask::new(move || {
        let current = Arc::clone(&current);
        let max_seen = Arc::clone(&max_seen);
        let done = Arc::clone(&done);
        async move {
            let now = current.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(duration).await;
            current.fetch_sub(1, Ordering::SeqCst);
            done.fetch_add(1, Ordering::SeqCst);
            Ok::<(), TaskError>(())
        }
    }))
}

#[tokio::test]
async fn in_flight_tasks_never_exceed_concurrency() {
    let scheduler = Scheduler::new(SchedulerConfig::new(3)).unwrap();
    let (handle, task) = scheduler.start();

    let current = Arc::new(AtomicU32::new(0));
    let max_seen = Arc::new(AtomicU32::new(0));
    let done = Arc::new(AtomicU32::new(0));

    for _ in 0..8 {
        handle
            .submit(gauge_task(&current, &max_seen, &done, Duration::from_millis(20)))
            .unwrap();
    }

    wait_until("all tasks to finish", Duration::from_secs(5), || {
        done.load(Ordering::SeqCst) == 8
    })
    .await;

    assert_eq!(max_seen.load(Ordering::SeqCst), 3);

    handle.shutdown().await.unwrap();
    let _ = task.await;
}

#[tokio::test]
async fn excess_task_waits_while_slots_are_full() {
    let scheduler = Scheduler::new(SchedulerConfig::new(2)).unwrap();
    let (handle, task) = scheduler.start();

    let slow_a = SlowTask::new("slow_a", Duration::from_millis(150));
    let slow_b = SlowTask::new("slow_b", Duration::from_millis(150));
    let third = SlowTask::new("third", Duration::from_millis(1));
    let third_started = Arc::clone(third.started_flag());
    let third_finished = Arc::clone(third.finished_flag());

    let a_started = Arc::clone(slow_a.started_flag());
    let b_started = Arc::clone(slow_b.started_flag());

    handle.submit(slow_a).unwrap();
    handle.submit(slow_b).unwrap();
    handle.submit(third).unwrap();

    wait_until("both slow tasks to start", Duration::from_secs(5), || {
        a_started.load(Ordering::SeqCst) && b_started.load(Ordering::SeqCst)
    })
    .await;

    // Both slots are occupied; the third task must not have started.
    assert!(!third_started.load(Ordering::SeqCst));

    wait_until("third task to finish", Duration::from_secs(5), || {
        third_finished.load(Ordering::SeqCst)
    })
    .await;

    handle.shutdown().await.unwrap();
    let _ = task.await;
}

#[tokio::test]
async fn freed_capacity_is_offered_to_queued_work() {
    let scheduler = Scheduler::new(SchedulerConfig::new(1)).unwrap();
    let (handle, task) = scheduler.start();

    let done = Arc::new(AtomicU32::new(0));
    let current = Arc::new(AtomicU32::new(0));
    let max_seen = Arc::new(AtomicU32::new(0));

    for _ in 0..5 {
        handle
            .submit(gauge_task(&current, &max_seen, &done, Duration::from_millis(5)))
            .unwrap();
    }

    wait_until("all tasks to finish", Duration::from_secs(5), || {
        done.load(Ordering::SeqCst) == 5
    })
    .await;

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);

    handle.shutdown().await.unwrap();
    let _ = task.await;
}

#[tokio::test]
async fn concurrency_one_serializes_execution() {
    let scheduler = Scheduler::new(SchedulerConfig::new(1)).unwrap();
    let (handle, task) = scheduler.start();

    let current = Arc::new(AtomicU32::new(0));
    let max_seen = Arc::new(AtomicU32::new(0));
    let done = Arc::new(AtomicU32::new(0));

    let start = tokio::time::Instant::now();
    for _ in 0..3 {
        handle
            .submit(gauge_task(&current, &max_seen, &done, Duration::from_millis(30)))
            .unwrap();
    }

    wait_until("all tasks to finish", Duration::from_secs(5), || {
        done.load(Ordering::SeqCst) == 3
    })
    .await;

    // Three 30ms tasks one at a time take at least 90ms.
    assert!(start.elapsed() >= Duration::from_millis(90));
    assert_eq!(max_seen.load(Ordering::SeqCst), 1);

    handle.shutdown().await.unwrap();
    let _ = task.await;
}
