use super::*;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn executor_runs_jobs_off_the_calling_thread() {
    let executor = StdExecutor::new(2);
    assert_eq!(executor.worker_count(), 2);

    let caller = std::thread::current().id();
    let (tx, rx) = mpsc::channel();
    executor.execute(Box::new(move || {
        tx.send(std::thread::current().id()).unwrap();
    }));

    let worker = rx.recv_timeout(Duration::from_secs(5)).expect("job ran");
    assert_ne!(worker, caller);
}

#[test]
fn dropping_executor_finishes_queued_jobs() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let executor = StdExecutor::new(1);
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            executor.execute(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
    }
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn scheduler_records_requests_and_wakes() {
    let scheduler = StdScheduler::new();
    let wakes = Arc::new(AtomicUsize::new(0));
    {
        let wakes = Arc::clone(&wakes);
        scheduler.set_drain_waker(move || {
            wakes.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert!(!scheduler.take_drain_request());
    scheduler.schedule_drain();
    assert_eq!(wakes.load(Ordering::SeqCst), 1);
    assert!(scheduler.take_drain_request());
    assert!(!scheduler.take_drain_request(), "request is consumed");

    scheduler.clear_drain_waker();
    scheduler.schedule_drain();
    assert_eq!(wakes.load(Ordering::SeqCst), 1);
    assert!(scheduler.wait_for_drain_request(Duration::from_millis(1)));
}

#[test]
fn wait_for_drain_request_times_out_without_work() {
    let scheduler = StdScheduler::new();
    assert!(!scheduler.wait_for_drain_request(Duration::from_millis(5)));
}

#[test]
fn std_runtime_pumps_results_posted_by_workers() {
    let runtime = StdRuntime::with_executor(StdExecutor::new(1));
    let handle = runtime.runtime_handle();
    let received = Rc::new(Cell::new(0u32));

    let id = {
        let received = Rc::clone(&received);
        handle
            .register_ui_cont(move |value: u32| received.set(value))
            .expect("runtime alive")
    };
    let dispatcher = handle.dispatcher();
    runtime
        .executor()
        .execute(Box::new(move || dispatcher.post_invoke(id, 7u32)));

    let mut pumped = false;
    for _ in 0..100 {
        if runtime.pump(Duration::from_millis(50)) && received.get() == 7 {
            pumped = true;
            break;
        }
    }
    assert!(pumped, "worker result reached the UI thread");
}
