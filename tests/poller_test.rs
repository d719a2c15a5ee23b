use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use poll_watch::{
    app::poller::{PollCompletion, Poller, PollerOptions, PollerStatus},
    infra::visibility::ManualVisibility,
    ports::PollPort,
};

const WAIT: Duration = Duration::from_millis(1000);
const MARGIN: Duration = Duration::from_millis(10);

type Rows = Vec<i32>;

#[derive(Clone, Default)]
struct RecordingPoll {
    calls: Arc<AtomicUsize>,
    pending: Arc<Mutex<VecDeque<PollCompletion<Rows, Rows>>>>,
}

impl RecordingPoll {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn outstanding(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    fn take(&self) -> PollCompletion<Rows, Rows> {
        self.pending
            .lock()
            .unwrap()
            .pop_front()
            .expect("a poll should be outstanding")
    }
}

impl PollPort<Rows, Rows> for RecordingPoll {
    fn poll(&self, completion: PollCompletion<Rows, Rows>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().unwrap().push_back(completion);
    }
}

struct Harness {
    poll: RecordingPoll,
    changes: Arc<Mutex<Vec<Rows>>>,
    errors: Arc<Mutex<Vec<Rows>>>,
    poller: Poller<Rows, Rows>,
}

impl Harness {
    fn new(visibility: Option<ManualVisibility>) -> Self {
        let poll = RecordingPoll::default();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));

        let change_sink = Arc::clone(&changes);
        let error_sink = Arc::clone(&errors);
        let mut options = PollerOptions::new(poll.clone(), WAIT)
            .on_change(move |value: &Rows| change_sink.lock().unwrap().push(value.clone()))
            .on_error(move |err: Rows| error_sink.lock().unwrap().push(err));
        if let Some(visibility) = visibility {
            options = options.visibility(Arc::new(visibility));
        }

        let poller = Poller::new(options).expect("poller should be created");
        Self {
            poll,
            changes,
            errors,
            poller,
        }
    }

    async fn status(&self) -> PollerStatus {
        self.poller.status().await.expect("driver should be running")
    }

    fn changes(&self) -> Vec<Rows> {
        self.changes.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<Rows> {
        self.errors.lock().unwrap().clone()
    }
}

#[tokio::test(start_paused = true)]
async fn never_started_poller_does_nothing() {
    let h = Harness::new(None);

    tokio::time::sleep(WAIT * 3).await;
    let status = h.status().await;

    assert_eq!(h.poll.calls(), 0);
    assert!(h.changes().is_empty());
    assert!(h.errors().is_empty());
    assert!(!status.started);
    assert!(status.stopped);
}

#[tokio::test(start_paused = true)]
async fn start_once_twice_issues_a_single_poll() {
    let h = Harness::new(None);

    h.poller.start_once().start_once();
    tokio::time::sleep(WAIT * 3).await;
    h.status().await;

    assert_eq!(h.poll.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn only_structurally_new_values_are_reported() {
    let h = Harness::new(None);
    h.poller.start_once();
    h.status().await;

    h.poll.take().success(vec![1, 2, 3]);
    h.status().await;
    assert_eq!(h.changes(), vec![vec![1, 2, 3]]);

    tokio::time::sleep(WAIT + MARGIN).await;
    h.status().await;
    assert_eq!(h.poll.calls(), 2);

    h.poll.take().success(vec![1, 2, 3]);
    h.status().await;
    assert_eq!(h.changes(), vec![vec![1, 2, 3]]);
}

#[tokio::test(start_paused = true)]
async fn poll_errors_go_to_the_error_sink_only() {
    let h = Harness::new(None);
    h.poller.start_once();
    h.status().await;

    h.poll.take().error(vec![3, 2, 1]);
    let status = h.status().await;

    assert_eq!(h.errors(), vec![vec![3, 2, 1]]);
    assert!(h.changes().is_empty());
    assert!(!status.is_polling);
}

#[tokio::test(start_paused = true)]
async fn stop_suppresses_the_pending_success_but_keeps_the_value() {
    let h = Harness::new(None);
    h.poller.start_once();
    h.status().await;

    h.poller.stop();
    h.poll.take().success(vec![9]);
    let status = h.status().await;

    assert!(h.changes().is_empty());
    assert!(status.stopped);
    assert!(status.has_observed_value);

    tokio::time::sleep(WAIT * 3).await;
    h.status().await;
    assert_eq!(h.poll.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn error_sink_still_fires_after_stop() {
    let h = Harness::new(None);
    h.poller.start_once();
    h.status().await;

    h.poller.stop();
    h.poll.take().error(vec![4]);
    h.status().await;

    assert_eq!(h.errors(), vec![vec![4]]);
}

#[tokio::test(start_paused = true)]
async fn stopped_poller_cannot_be_restarted() {
    let h = Harness::new(None);

    h.poller.start_once().stop().start_once();
    tokio::time::sleep(WAIT * 3).await;
    let status = h.status().await;

    assert_eq!(h.poll.calls(), 1);
    assert!(status.stopped);
}

#[tokio::test(start_paused = true)]
async fn pause_before_start_prevents_polling_until_resumed() {
    let h = Harness::new(None);

    h.poller.set_paused(true).start_once();
    tokio::time::sleep(WAIT * 3).await;
    h.status().await;
    assert_eq!(h.poll.calls(), 0);

    h.poller.set_paused(false);
    h.status().await;
    assert_eq!(h.poll.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn pause_does_not_suppress_an_in_flight_result() {
    let h = Harness::new(None);
    h.poller.start_once();
    h.status().await;

    h.poller.set_paused(true);
    h.poll.take().success(vec![5]);
    h.status().await;
    assert_eq!(h.changes(), vec![vec![5]]);

    tokio::time::sleep(WAIT * 3).await;
    h.status().await;
    assert_eq!(h.poll.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn hidden_at_construction_blocks_start_until_visible() {
    let visibility = ManualVisibility::new(false);
    let h = Harness::new(Some(visibility.clone()));

    h.poller.start_once();
    tokio::time::sleep(WAIT * 3).await;
    let status = h.status().await;
    assert_eq!(h.poll.calls(), 0);
    assert!(status.paused);

    visibility.set_visible(true);
    let status = h.status().await;
    assert_eq!(h.poll.calls(), 1);
    assert!(!status.paused);
}

#[tokio::test(start_paused = true)]
async fn hiding_stops_rescheduling_and_showing_resumes() {
    let visibility = ManualVisibility::new(true);
    let h = Harness::new(Some(visibility.clone()));
    h.poller.start_once();
    h.status().await;

    visibility.set_visible(false);
    h.poll.take().success(vec![1]);
    tokio::time::sleep(WAIT * 3).await;
    h.status().await;
    assert_eq!(h.poll.calls(), 1);

    visibility.set_visible(true);
    h.status().await;
    assert_eq!(h.poll.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn at_most_one_poll_is_outstanding() {
    let h = Harness::new(None);
    h.poller.start_once();

    for _ in 0..5 {
        tokio::time::sleep(WAIT * 2).await;
        h.poller.set_paused(false);
        let status = h.status().await;
        assert_eq!(h.poll.calls(), 1);
        assert_eq!(h.poll.outstanding(), 1);
        assert!(status.is_polling);
    }

    h.poll.take().success(vec![1]);
    tokio::time::sleep(WAIT + MARGIN).await;
    h.status().await;
    assert_eq!(h.poll.calls(), 2);
    assert_eq!(h.poll.outstanding(), 1);
}

#[tokio::test(start_paused = true)]
async fn next_poll_waits_for_the_throttle_window() {
    let h = Harness::new(None);
    h.poller.start_once();
    h.status().await;

    h.poll.take().success(vec![1]);
    tokio::time::sleep(WAIT / 2).await;
    h.status().await;
    assert_eq!(h.poll.calls(), 1);

    tokio::time::sleep(WAIT / 2 + MARGIN).await;
    h.status().await;
    assert_eq!(h.poll.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn completion_resolved_synchronously_is_handled_on_a_later_turn() {
    let calls = Arc::new(AtomicUsize::new(0));
    let changes = Arc::new(Mutex::new(Vec::new()));

    let poll_calls = Arc::clone(&calls);
    let change_sink = Arc::clone(&changes);
    let options = PollerOptions::new(
        move |completion: PollCompletion<usize, String>| {
            let call = poll_calls.fetch_add(1, Ordering::SeqCst);
            completion.success(call);
        },
        WAIT,
    )
    .on_change(move |value: &usize| change_sink.lock().unwrap().push(*value));

    let poller = Poller::new(options).expect("poller should be created");
    poller.start_once();
    tokio::time::sleep(WAIT * 2 + MARGIN).await;
    poller.stop();
    poller.status().await.expect("driver should be running");

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(*changes.lock().unwrap(), vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn stop_twice_is_a_no_op() {
    let h = Harness::new(None);
    h.poller.start_once();
    h.status().await;

    h.poller.stop().stop().start_once();
    h.poll.take().success(vec![1]);
    tokio::time::sleep(WAIT * 3).await;
    let status = h.status().await;

    assert!(status.stopped);
    assert!(!status.is_polling);
    assert_eq!(h.poll.calls(), 1);
    assert!(h.changes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn trailing_call_scheduled_before_pause_still_polls_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let poll_calls = Arc::clone(&calls);
    let options = PollerOptions::new(
        move |completion: PollCompletion<usize, String>| {
            let call = poll_calls.fetch_add(1, Ordering::SeqCst);
            completion.success(call);
        },
        WAIT,
    );

    let poller = Poller::new(options).expect("poller should be created");
    poller.start_once();
    // Lets the first success reschedule into the throttle window.
    tokio::time::sleep(MARGIN).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    poller.set_paused(true);
    tokio::time::sleep(WAIT * 5).await;
    let status = poller.status().await.expect("driver should be running");

    assert!(status.paused);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn completion_after_all_handles_dropped_is_harmless() {
    let h = Harness::new(None);
    h.poller.start_once();
    h.status().await;

    let completion = h.poll.take();
    drop(h);
    completion.success(vec![1]);
    tokio::task::yield_now().await;
}

#[test]
fn poller_requires_a_tokio_runtime() {
    let options = PollerOptions::new(RecordingPoll::default(), WAIT);

    let err = Poller::<Rows, Rows>::new(options).expect_err("no runtime should fail");
    assert!(err.to_string().contains("tokio runtime"));
}
