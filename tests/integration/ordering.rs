//! Priority ordering tests.
//!
//! With concurrency 1, execution order must equal: priority descending,
//! ties broken by submission order ascending.

use presto::{FnTask, Scheduler, SchedulerConfig, Task, TaskError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::common::wait_until;

/// Task that appends its value to a shared log when executed.
fn logging_task(log: &Arc<Mutex<Vec<i32>>>, value: i32) -> Arc<dyn Task> {
    let log = Arc::clone(log);
    Arc::new(FnTask::named(format!("task_{}", value), move || {
        let log = Arc::clone(&log);
        async move {
            log.lock().expect("lock poisoned").push(value);
            Ok::<(), TaskError>(())
        }
    }))
}

fn log_len(log: &Arc<Mutex<Vec<i32>>>) -> usize {
    log.lock().expect("lock poisoned").len()
}

#[tokio::test]
async fn higher_priority_runs_first() {
    let scheduler = Scheduler::new(SchedulerConfig::new(1)).unwrap();
    let (handle, task) = scheduler.start();
    let log = Arc::new(Mutex::new(Vec::new()));

    handle.submit_with_priority(logging_task(&log, 1), 1).unwrap();
    handle.submit_with_priority(logging_task(&log, 3), 3).unwrap();
    handle.submit_with_priority(logging_task(&log, 2), 2).unwrap();

    wait_until("all tasks to run", Duration::from_secs(5), || {
        log_len(&log) == 3
    })
    .await;

    assert_eq!(*log.lock().unwrap(), vec![3, 2, 1]);

    handle.shutdown().await.unwrap();
    let _ = task.await;
}

#[tokio::test]
async fn equal_priorities_run_in_submission_order() {
    let scheduler = Scheduler::new(SchedulerConfig::new(1)).unwrap();
    let (handle, task) = scheduler.start();
    let log = Arc::new(Mutex::new(Vec::new()));

    for value in 1..=5 {
        handle.submit(logging_task(&log, value)).unwrap();
    }

    wait_until("all tasks to run", Duration::from_secs(5), || {
        log_len(&log) == 5
    })
    .await;

    assert_eq!(*log.lock().unwrap(), vec![1, 2, 3, 4, 5]);

    handle.shutdown().await.unwrap();
    let _ = task.await;
}

#[tokio::test]
async fn ties_break_by_submission_order_within_priority() {
    let scheduler = Scheduler::new(SchedulerConfig::new(1)).unwrap();
    let (handle, task) = scheduler.start();
    let log = Arc::new(Mutex::new(Vec::new()));

    handle.submit_with_priority(logging_task(&log, 10), 5).unwrap();
    handle.submit_with_priority(logging_task(&log, 20), 1).unwrap();
    handle.submit_with_priority(logging_task(&log, 11), 5).unwrap();
    handle.submit_with_priority(logging_task(&log, 21), 1).unwrap();

    wait_until("all tasks to run", Duration::from_secs(5), || {
        log_len(&log) == 4
    })
    .await;

    assert_eq!(*log.lock().unwrap(), vec![10, 11, 20, 21]);

    handle.shutdown().await.unwrap();
    let _ = task.await;
}

#[tokio::test]
async fn negative_priority_runs_after_default() {
    let scheduler = Scheduler::new(SchedulerConfig::new(1)).unwrap();
    let (handle, task) = scheduler.start();
    let log = Arc::new(Mutex::new(Vec::new()));

    handle.submit_with_priority(logging_task(&log, -1), -1).unwrap();
    handle.submit(logging_task(&log, 0)).unwrap();
    handle.submit_with_priority(logging_task(&log, 7), 7).unwrap();

    wait_until("all tasks to run", Duration::from_secs(5), || {
        log_len(&log) == 3
    })
    .await;

    assert_eq!(*log.lock().unwrap(), vec![7, 0, -1]);

    handle.shutdown().await.unwrap();
    let _ = task.await;
}

#[tokio::test]
async fn tasks_submitted_after_a_drain_still_order_by_priority() {
    let scheduler = Scheduler::new(SchedulerConfig::new(1)).unwrap();
    let (handle, task) = scheduler.start();
    let log = Arc::new(Mutex::new(Vec::new()));

    handle.submit(logging_task(&log, 1)).unwrap();
    wait_until("first drain", Duration::from_secs(5), || log_len(&log) == 1).await;

    handle.submit_with_priority(logging_task(&log, 2), 2).unwrap();
    handle.submit_with_priority(logging_task(&log, 9), 9).unwrap();

    wait_until("second batch", Duration::from_secs(5), || {
        log_len(&log) == 3
    })
    .await;

    assert_eq!(*log.lock().unwrap(), vec![1, 9, 2]);

    handle.shutdown().await.unwrap();
    let _ = task.await;
}
