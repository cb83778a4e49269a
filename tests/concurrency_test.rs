//! Concurrency bound of `Converter::convert_all`.
//!
//! Every conversion runs inside a `convert_chapter` span, so a subscriber
//! layer that tracks open spans sees exactly how many chapters are in
//! flight. This lives in its own test binary because it installs the
//! global subscriber.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use quire::Converter;
use tempfile::TempDir;
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

#[derive(Default)]
struct SpanCounts {
    open: HashSet<u64>,
    peak: usize,
    total: usize,
}

/// Counts `convert_chapter` spans that are open at the same time.
#[derive(Clone, Default)]
struct ChapterSpans(Arc<Mutex<SpanCounts>>);

impl ChapterSpans {
    /// Return (peak, total) since the last call and start over.
    fn take(&self) -> (usize, usize) {
        let mut counts = self.0.lock().unwrap();
        assert!(counts.open.is_empty(), "spans still open after convert_all");
        let seen = (counts.peak, counts.total);
        *counts = SpanCounts::default();
        seen
    }
}

impl<S: Subscriber> Layer<S> for ChapterSpans {
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, _ctx: Context<'_, S>) {
        if attrs.metadata().name() == "convert_chapter" {
            let mut counts = self.0.lock().unwrap();
            counts.open.insert(id.into_u64());
            counts.total += 1;
            counts.peak = counts.peak.max(counts.open.len());
        }
    }

    fn on_close(&self, id: Id, _ctx: Context<'_, S>) {
        self.0.lock().unwrap().open.remove(&id.into_u64());
    }
}

fn chapter_page(n: usize) -> String {
    let body = "<p>The legions marched on through the night.</p>".repeat(40);
    format!(
        r#"<html><body><h1 class="entry-title">Ch {n}</h1>
<div class="entry-content"><p><a href="/prev">Previous</a></p>{body}<p><a href="/next">Next</a></p></div>
</body></html>"#
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_convert_all_honours_pool_width() {
    let spans = ChapterSpans::default();
    tracing::subscriber::set_global_default(Registry::default().with(spans.clone())).unwrap();

    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    let out = tmp.path().join("chapters");
    std::fs::create_dir_all(&cache).unwrap();
    std::fs::create_dir_all(&out).unwrap();
    for n in 1..=30 {
        std::fs::write(cache.join(format!("{n:03}.html")), chapter_page(n)).unwrap();
    }

    let converter = Converter::new();
    assert_eq!(converter.concurrency(), 10);
    let docs = converter.convert_all(&cache, &out).await.unwrap();
    assert_eq!(docs.len(), 30);
    assert_eq!(docs[0].title, "Ch 1");
    assert_eq!(docs[29].title, "Ch 30");

    let (peak, total) = spans.take();
    assert_eq!(total, 30);
    assert!(peak <= 10, "{peak} conversions in flight");
    assert!(peak > 1, "conversions never overlapped");

    let docs = Converter::new()
        .with_concurrency(3)
        .convert_all(&cache, &out)
        .await
        .unwrap();
    assert_eq!(docs.len(), 30);

    let (peak, total) = spans.take();
    assert_eq!(total, 30);
    assert!(peak <= 3, "{peak} conversions in flight");
}
