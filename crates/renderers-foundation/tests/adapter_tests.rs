use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use renderers_foundation::{
    AsyncRendererAdapter, DifferConfig, InflationContext, ItemCallback, ListUpdate, Payload,
    RecyclerAdapter, Renderer, RendererBuilder, RendererError, RendererResolver,
    RendererViewHolder, Snapshot, ViewType,
};
use renderers_testing::prelude::*;

#[derive(Clone, Debug, PartialEq)]
enum Feed {
    Header(&'static str),
    Post { id: u32, text: &'static str },
    Ad(u32),
}

fn post(id: u32, text: &'static str) -> Feed {
    Feed::Post { id, text }
}

struct FeedCallback;

impl ItemCallback<Feed> for FeedCallback {
    fn are_items_the_same(&self, old: &Feed, new: &Feed) -> bool {
        match (old, new) {
            (Feed::Header(a), Feed::Header(b)) => a == b,
            (Feed::Post { id: a, .. }, Feed::Post { id: b, .. }) => a == b,
            (Feed::Ad(a), Feed::Ad(b)) => a == b,
            _ => false,
        }
    }

    fn are_contents_the_same(&self, old: &Feed, new: &Feed) -> bool {
        old == new
    }
}

/// Same identity rules, but every change carries a payload.
struct PayloadFeedCallback;

impl ItemCallback<Feed> for PayloadFeedCallback {
    fn are_items_the_same(&self, old: &Feed, new: &Feed) -> bool {
        FeedCallback.are_items_the_same(old, new)
    }

    fn are_contents_the_same(&self, old: &Feed, new: &Feed) -> bool {
        old == new
    }

    fn change_payload(&self, _old: &Feed, _new: &Feed) -> Option<Payload> {
        Some(Arc::new("text"))
    }
}

fn feed_builder(log: &RendererLog<Feed>) -> RendererBuilder<Feed> {
    let headers = log.clone();
    let posts = log.clone();
    RendererBuilder::new()
        .bind(
            |item: &Feed| matches!(item, Feed::Header(_)),
            move |_| RecordingRenderer::new("header", headers.clone()),
        )
        .bind(
            |item: &Feed| matches!(item, Feed::Post { .. }),
            move |_| RecordingRenderer::new("post", posts.clone()),
        )
}

struct Fixture {
    runtime: TestRuntime,
    executor: Arc<ManualExecutor>,
    log: RendererLog<Feed>,
    adapter: AsyncRendererAdapter<Feed>,
    recycler: Rc<TestRecycler<Feed>>,
}

impl Fixture {
    fn new() -> Self {
        Self::build(FeedCallback, DifferConfig::default())
    }

    fn build(callback: impl ItemCallback<Feed>, config: DifferConfig) -> Self {
        let runtime = TestRuntime::new();
        let executor = Arc::new(ManualExecutor::new());
        let log = RendererLog::default();
        let adapter = AsyncRendererAdapter::with_config(
            feed_builder(&log),
            callback,
            runtime.handle(),
            executor.clone(),
            config,
        );
        let recycler = Rc::new(TestRecycler::new(1));
        adapter.attach(recycler.clone());
        Self {
            runtime,
            executor,
            log,
            adapter,
            recycler,
        }
    }

    /// Finishes every queued diff and applies the results.
    fn settle(&self) {
        self.executor.run_all();
        self.runtime.drain();
    }

    fn layout(&self) -> Result<LayoutReport, RendererError> {
        self.recycler.layout(&self.adapter)
    }

    /// Submits `items` as the first list and lays it out.
    fn start_with(&self, items: Vec<Feed>) {
        self.adapter.submit_list(items);
        self.recycler.take_updates();
        self.layout().expect("initial layout");
        self.log.borrow_mut().clear();
    }

    fn rendered(&self) -> Vec<(Feed, usize, usize)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                RendererEvent::Rendered {
                    content,
                    position,
                    payloads,
                    ..
                } => Some((content.clone(), *position, *payloads)),
                _ => None,
            })
            .collect()
    }
}

#[test]
fn empty_adapter_reports_bounds_errors() {
    let fixture = Fixture::new();
    assert_eq!(fixture.adapter.item_count(), 0);
    assert_eq!(
        fixture.adapter.get_item(0),
        Err(RendererError::IndexOutOfRange { index: 0, len: 0 })
    );
    let err = fixture.adapter.item_view_type(0).unwrap_err();
    assert!(!err.is_configuration());
}

#[test]
fn first_list_is_inserted_synchronously() {
    let fixture = Fixture::new();
    fixture
        .adapter
        .submit_list(vec![Feed::Header("today"), post(1, "a"), post(2, "b")]);

    assert_eq!(fixture.adapter.item_count(), 3);
    assert_eq!(fixture.executor.pending(), 0);
    assert_eq!(
        fixture.recycler.take_updates(),
        vec![ListUpdate::Inserted {
            position: 0,
            count: 3
        }]
    );

    let report = fixture.layout().unwrap();
    assert_eq!(report.created, 3);
    assert_eq!(report.bound, 3);
    assert_eq!(
        fixture.rendered(),
        vec![
            (Feed::Header("today"), 0, 0),
            (post(1, "a"), 1, 0),
            (post(2, "b"), 2, 0),
        ]
    );
}

#[test]
fn classification_follows_registration_order() {
    let fixture = Fixture::new();
    fixture
        .adapter
        .submit_list(vec![post(1, "a"), Feed::Header("h")]);
    assert_eq!(fixture.adapter.item_view_type(0), Ok(ViewType(1)));
    assert_eq!(fixture.adapter.item_view_type(1), Ok(ViewType(0)));
    assert_eq!(
        fixture.adapter.item_view_type(0),
        fixture.adapter.item_view_type(0)
    );
}

#[test]
fn identical_resubmission_changes_nothing() {
    let fixture = Fixture::new();
    let items = vec![Feed::Header("h"), post(1, "a"), post(2, "b")];
    fixture.start_with(items.clone());

    fixture.adapter.submit_list(items);
    assert_eq!(fixture.executor.pending(), 1);
    fixture.settle();

    assert!(fixture.recycler.take_updates().is_empty());
    let report = fixture.layout().unwrap();
    assert_eq!(report, LayoutReport::default());
    assert!(fixture.rendered().is_empty());
}

#[test]
fn removal_recycles_the_holder() {
    let fixture = Fixture::new();
    fixture.start_with(vec![post(1, "a"), post(2, "b"), post(3, "c")]);

    fixture
        .adapter
        .submit_list(vec![post(1, "a"), post(3, "c")]);
    fixture.settle();

    assert_eq!(
        fixture.recycler.take_updates(),
        vec![ListUpdate::Removed {
            position: 1,
            count: 1
        }]
    );
    let report = fixture.layout().unwrap();
    assert_eq!(report.recycled, 1);
    assert_eq!(fixture.recycler.attached_count(), 2);
    assert_eq!(fixture.recycler.pool_stats().recycled, 1);
    // The shifted row is rebound at its new position.
    assert_eq!(fixture.rendered(), vec![(post(3, "c"), 1, 0)]);
}

#[test]
fn reorder_is_a_single_move() {
    let fixture = Fixture::new();
    fixture.start_with(vec![post(1, "a"), post(2, "b"), post(3, "c")]);

    fixture
        .adapter
        .submit_list(vec![post(2, "b"), post(1, "a"), post(3, "c")]);
    fixture.settle();

    let updates = fixture.recycler.take_updates();
    assert_eq!(updates.len(), 1);
    assert!(matches!(updates[0], ListUpdate::Moved { .. }));

    let report = fixture.layout().unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(
        fixture
            .recycler
            .with_renderer::<RecordingRenderer<Feed>, _>(0, |renderer| renderer
                .content()
                .cloned()),
        Some(Some(post(2, "b")))
    );
}

#[test]
fn content_change_rebinds_in_place() {
    let fixture = Fixture::new();
    fixture.start_with(vec![post(1, "a")]);

    fixture.adapter.submit_list(vec![post(1, "edited")]);
    fixture.settle();

    assert_eq!(
        fixture.recycler.take_updates(),
        vec![ListUpdate::Changed {
            position: 0,
            count: 1,
            payload: None
        }]
    );
    let report = fixture.layout().unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(fixture.rendered(), vec![(post(1, "edited"), 0, 0)]);
}

#[test]
fn change_payload_reaches_render() {
    let fixture = Fixture::build(PayloadFeedCallback, DifferConfig::default());
    fixture.start_with(vec![post(1, "a"), post(2, "b")]);

    fixture
        .adapter
        .submit_list(vec![post(1, "a"), post(2, "b2")]);
    fixture.settle();
    fixture.layout().unwrap();

    assert_eq!(fixture.rendered(), vec![(post(2, "b2"), 1, 1)]);
}

#[test]
fn unresolved_content_creates_no_holder() {
    let fixture = Fixture::new();
    fixture.adapter.submit_list(vec![Feed::Ad(7)]);

    let err = fixture.layout().unwrap_err();
    assert!(matches!(err, RendererError::UnresolvedContent { .. }));
    assert!(err.is_configuration());
    assert_eq!(fixture.recycler.attached_count(), 0);
    assert_eq!(fixture.recycler.pool_stats().created, 0);
}

#[test]
fn latest_submission_wins_when_older_job_finishes_last() {
    let fixture = Fixture::new();
    fixture.start_with(vec![post(1, "a")]);
    let commits = Rc::new(RefCell::new(Vec::new()));

    {
        let commits = commits.clone();
        fixture
            .adapter
            .submit_list_with_commit(vec![post(1, "a"), post(2, "b")], move || {
                commits.borrow_mut().push("older")
            });
    }
    {
        let commits = commits.clone();
        fixture
            .adapter
            .submit_list_with_commit(vec![post(3, "c")], move || {
                commits.borrow_mut().push("newer")
            });
    }
    assert_eq!(fixture.executor.pending(), 2);

    assert!(fixture.executor.run_last());
    fixture.runtime.drain();
    assert_eq!(fixture.adapter.current_list().as_ref(), &[post(3, "c")]);

    assert!(fixture.executor.run_next());
    fixture.runtime.drain();
    assert_eq!(fixture.adapter.current_list().as_ref(), &[post(3, "c")]);
    assert_eq!(*commits.borrow(), vec!["newer"]);
    assert_eq!(
        fixture.recycler.take_updates(),
        vec![
            ListUpdate::Removed {
                position: 0,
                count: 1
            },
            ListUpdate::Inserted {
                position: 0,
                count: 1
            },
        ]
    );
}

#[test]
fn result_posted_before_supersession_is_discarded() {
    let fixture = Fixture::new();
    fixture.start_with(vec![post(1, "a")]);

    fixture
        .adapter
        .submit_list(vec![post(1, "a"), post(2, "b")]);
    // The older diff finishes and posts its result, but nobody drains yet.
    assert!(fixture.executor.run_next());

    fixture
        .adapter
        .submit_list(vec![post(1, "a"), post(4, "d")]);
    fixture.settle();

    assert_eq!(
        fixture.adapter.current_list().as_ref(),
        &[post(1, "a"), post(4, "d")]
    );
    assert_eq!(
        fixture.recycler.take_updates(),
        vec![ListUpdate::Inserted {
            position: 1,
            count: 1
        }]
    );
    assert!(!fixture.adapter.differ().has_pending_diff());
}

#[test]
fn binding_twice_without_payloads_is_idempotent() {
    let fixture = Fixture::new();
    fixture
        .adapter
        .submit_list(vec![Feed::Header("h"), post(1, "a")]);
    let context = InflationContext::new(1);
    let view_type = fixture.adapter.item_view_type(1).unwrap();
    let mut holder = fixture
        .adapter
        .create_view_holder(&context, view_type)
        .unwrap();

    fixture
        .adapter
        .bind_view_holder(&mut holder, 1, &[])
        .unwrap();
    let first = (
        holder.renderer().unwrap().content().cloned(),
        holder.renderer().unwrap().position(),
    );
    fixture
        .adapter
        .bind_view_holder(&mut holder, 1, &[])
        .unwrap();
    let second = (
        holder.renderer().unwrap().content().cloned(),
        holder.renderer().unwrap().position(),
    );

    assert_eq!(first, second);
    assert_eq!(holder.bound_position(), Some(1));
    let rendered = fixture.rendered();
    assert_eq!(rendered.len(), 2);
    assert_eq!(rendered[0], rendered[1]);
}

#[test]
fn binding_out_of_range_fails() {
    let fixture = Fixture::new();
    fixture.adapter.submit_list(vec![post(1, "a")]);
    let mut holder = fixture
        .adapter
        .create_view_holder(&InflationContext::new(1), ViewType(1))
        .unwrap();
    assert_eq!(
        fixture.adapter.bind_view_holder(&mut holder, 3, &[]),
        Err(RendererError::IndexOutOfRange { index: 3, len: 1 })
    );
}

#[test]
fn placeholder_holder_cannot_be_bound() {
    let fixture = Fixture::new();
    fixture.adapter.submit_list(vec![post(1, "a")]);
    let mut holder = RendererViewHolder::placeholder(ViewType(1));
    assert_eq!(
        fixture.adapter.bind_view_holder(&mut holder, 0, &[]),
        Err(RendererError::NullRenderer {
            view_type: ViewType(1)
        })
    );
}

struct EmptyResolver;

impl RendererResolver<Feed> for EmptyResolver {
    fn view_type(&self, _content: &Feed) -> Result<ViewType, RendererError> {
        Ok(ViewType(0))
    }

    fn create_view_holder(
        &self,
        _view_type: ViewType,
        _context: &InflationContext,
    ) -> Result<Option<RendererViewHolder<Feed>>, RendererError> {
        Ok(None)
    }
}

#[test]
fn resolver_without_holder_is_reported() {
    let runtime = TestRuntime::new();
    let adapter = AsyncRendererAdapter::new(
        EmptyResolver,
        FeedCallback,
        runtime.handle(),
        Arc::new(InlineExecutor),
    );
    assert_eq!(
        adapter
            .create_view_holder(&InflationContext::new(0), ViewType(0))
            .unwrap_err(),
        RendererError::NullViewHolder {
            view_type: ViewType(0)
        }
    );
}

#[test]
fn extra_values_run_after_content_and_before_render() {
    let runtime = TestRuntime::new();
    let log = RendererLog::default();
    let adapter = AsyncRendererAdapter::new(
        feed_builder(&log),
        FeedCallback,
        runtime.handle(),
        Arc::new(InlineExecutor),
    )
    .with_extra_values(|item, renderer, position| {
        assert_eq!(renderer.content(), Some(item));
        assert_eq!(renderer.position(), position);
        if let Some(recording) = renderer
            .as_any_mut()
            .downcast_mut::<RecordingRenderer<Feed>>()
        {
            recording.extra = Some(format!("row {position}"));
        }
    });
    let recycler = Rc::new(TestRecycler::new(1));
    adapter.attach(recycler.clone());
    adapter.submit_list(vec![Feed::Header("h"), post(1, "a")]);
    recycler.layout(&adapter).unwrap();

    let extra = recycler.with_renderer::<RecordingRenderer<Feed>, _>(1, |renderer| {
        renderer.extra.clone()
    });
    assert_eq!(extra, Some(Some("row 1".to_string())));
}

#[test]
fn lifecycle_hooks_are_forwarded() {
    let fixture = Fixture::new();
    fixture.adapter.submit_list(vec![post(1, "a"), post(2, "b")]);
    fixture.layout().unwrap();
    let attached = fixture
        .log
        .borrow()
        .iter()
        .filter(|event| matches!(event, RendererEvent::Attached { .. }))
        .count();
    assert_eq!(attached, 2);
    fixture.recycler.take_updates();

    fixture.adapter.submit_list(Vec::new());
    assert_eq!(
        fixture.recycler.take_updates(),
        vec![ListUpdate::Removed {
            position: 0,
            count: 2
        }]
    );
    let report = fixture.layout().unwrap();
    assert_eq!(report.recycled, 2);

    let log = fixture.log.borrow();
    let detached = log
        .iter()
        .filter(|event| matches!(event, RendererEvent::Detached { .. }))
        .count();
    let recycled = log
        .iter()
        .filter(|event| matches!(event, RendererEvent::Recycled { .. }))
        .count();
    assert_eq!((detached, recycled), (2, 2));
}

#[test]
fn recycled_holders_are_reused_for_new_items() {
    let fixture = Fixture::new();
    fixture.start_with(vec![post(1, "a"), post(2, "b")]);

    fixture.adapter.submit_list(Vec::new());
    fixture.layout().unwrap();
    fixture.adapter.submit_list(vec![post(3, "c")]);
    let report = fixture.layout().unwrap();

    assert_eq!(report.created, 0);
    let stats = fixture.recycler.pool_stats();
    assert_eq!(stats.created, 2);
    assert_eq!(stats.reused, 1);
    assert_eq!(
        fixture
            .recycler
            .with_holder(0, |holder| holder.bound_position()),
        Some(Some(0))
    );
}

#[test]
fn listeners_and_commit_run_after_the_list_is_applied() {
    let fixture = Fixture::new();
    fixture.start_with(vec![post(1, "a")]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let listener = {
        let seen = seen.clone();
        fixture
            .adapter
            .differ()
            .add_list_listener(move |previous, current| {
                seen.borrow_mut().push((previous.len(), current.len()))
            })
    };
    let committed = Rc::new(Cell::new(false));
    {
        let committed = committed.clone();
        let seen = seen.clone();
        fixture.adapter.submit_list_with_commit(
            vec![post(1, "a"), post(2, "b")],
            move || {
                assert_eq!(seen.borrow().len(), 1, "listeners run before commit");
                committed.set(true);
            },
        );
    }
    assert!(!committed.get());
    fixture.settle();
    assert!(committed.get());
    assert_eq!(*seen.borrow(), vec![(1, 2)]);

    assert!(fixture.adapter.differ().remove_list_listener(listener));
    assert!(!fixture.adapter.differ().remove_list_listener(listener));
    fixture.adapter.submit_list(vec![post(2, "b")]);
    fixture.settle();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn same_snapshot_only_runs_commit() {
    let fixture = Fixture::new();
    fixture.start_with(vec![post(1, "a")]);
    let snapshot: Snapshot<Feed> = fixture.adapter.current_list();
    let committed = Rc::new(Cell::new(false));
    {
        let committed = committed.clone();
        fixture
            .adapter
            .submit_list_with_commit(snapshot, move || committed.set(true));
    }
    assert!(committed.get());
    assert_eq!(fixture.executor.pending(), 0);
    assert!(fixture.recycler.take_updates().is_empty());
}

#[test]
fn reorders_without_move_detection_remove_and_insert() {
    let fixture = Fixture::build(FeedCallback, DifferConfig::without_moves());
    fixture.start_with(vec![post(1, "a"), post(2, "b"), post(3, "c")]);

    fixture
        .adapter
        .submit_list(vec![post(2, "b"), post(3, "c"), post(1, "a")]);
    fixture.settle();

    let updates = fixture.recycler.take_updates();
    assert!(updates
        .iter()
        .all(|update| !matches!(update, ListUpdate::Moved { .. })));
    assert_eq!(
        updates,
        vec![
            ListUpdate::Removed {
                position: 0,
                count: 1
            },
            ListUpdate::Inserted {
                position: 2,
                count: 1
            },
        ]
    );
}

#[test]
fn viewport_only_binds_visible_rows() {
    let runtime = TestRuntime::new();
    let log = RendererLog::default();
    let adapter = AsyncRendererAdapter::new(
        feed_builder(&log),
        FeedCallback,
        runtime.handle(),
        Arc::new(InlineExecutor),
    );
    let recycler = Rc::new(TestRecycler::new(1).with_viewport(2));
    adapter.attach(recycler.clone());
    adapter.submit_list((1..=5).map(|id| post(id, "x")).collect::<Vec<_>>());

    let report = recycler.layout(&adapter).unwrap();
    assert_eq!(report.created, 2);
    assert_eq!(recycler.row_count(), 5);
    assert_eq!(recycler.attached_count(), 2);
}
