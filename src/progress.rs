//! Terminal progress for verbose runs.
//!
//! Bridges the retriever's [`ProgressCallback`] to an `indicatif` bar on
//! stderr, one tick per finished query.

use es_retrieve::{ProgressCallback, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};

/// Build a progress bar and the callback that drives it.
///
/// The bar stays hidden until the retriever reports the batch size.
pub fn query_progress() -> (ProgressBar, ProgressCallback) {
    let bar = ProgressBar::hidden();
    if let Ok(style) =
        ProgressStyle::with_template("  Searching [{bar:30}] {pos}/{len} queries {per_sec} ETA {eta}")
    {
        bar.set_style(style);
    }

    let handle = bar.clone();
    let callback: ProgressCallback = Box::new(move |event| apply(&handle, event));
    (bar, callback)
}

fn apply(bar: &ProgressBar, event: ProgressEvent) {
    match event {
        ProgressEvent::BatchStarted { total } => {
            bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            bar.set_length(total as u64);
            bar.set_position(0);
        }
        ProgressEvent::QueryCompleted { completed, .. } => bar.set_position(completed as u64),
        ProgressEvent::QueryFailed { qid, .. } => {
            bar.inc(1);
            bar.println(format!("  query {qid} failed"));
        }
        ProgressEvent::BatchFinished { .. } => bar.finish_and_clear(),
    }
}
