//! Drives an [`AsyncRendererAdapter`] through a few feed updates, with diffs
//! computed on worker threads and applied on the main thread.

mod console;
mod feed;

use std::rc::Rc;
use std::time::Duration;

use renderers_foundation::AsyncRendererAdapter;
use renderers_runtime_std::StdRuntime;

use console::{ConsoleList, Screen};

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== Renderers feed demo ===");

    let runtime = StdRuntime::new();
    let screen = Screen::default();
    let adapter = AsyncRendererAdapter::new(
        feed::renderers(&screen),
        feed::FeedDiff,
        runtime.runtime_handle(),
        runtime.executor(),
    )
    .with_extra_values(feed::mark_trending);

    let list = Rc::new(ConsoleList::new(0, screen));
    adapter.attach(list.clone());

    for (step, items) in feed::timeline().into_iter().enumerate() {
        adapter.submit_list(items);
        while adapter.differ().has_pending_diff() {
            runtime.pump(Duration::from_millis(50));
        }
        list.layout(&adapter)?;

        println!();
        println!("--- version {step} ---");
        list.print();
    }
    Ok(())
}
