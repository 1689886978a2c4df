//! Page-loaded signal emitted independently of extraction.

use std::sync::Arc;
use std::time::Duration;

use rs_pagescrape::{ChannelEmitter, EngineOptions, HostBridge, MemoryViewport, ScrapeEngine};
use serde_json::Value;
use tokio::time::Instant;

fn labelled(label: &str) -> EngineOptions {
    EngineOptions {
        window_label: Some(label.to_string()),
        ..EngineOptions::default()
    }
}

#[tokio::test(start_paused = true)]
async fn final_page_emits_page_loaded() {
    let page = Arc::new(MemoryViewport::new("https://example.com/", "<p>hi</p>"));
    let (emitter, mut rx) = ChannelEmitter::new();
    let bridge = HostBridge::with_emitter(Arc::new(emitter));
    let engine = ScrapeEngine::new(page, bridge, labelled("main"));

    let emitted = engine.spawn_lifecycle_signaler().await.expect("signaler task panicked");

    assert!(emitted);
    let mut loaded = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if event.channel.starts_with("page_loaded") {
            loaded.push((event.channel, event.payload));
        }
    }
    assert_eq!(loaded, vec![("page_loaded_main".to_string(), Value::Null)]);
}

#[tokio::test(start_paused = true)]
async fn redirect_page_logs_warning_and_stays_silent() {
    let page = Arc::new(MemoryViewport::new("https://cn.bing.com/ck/a?u=a1x", ""));
    let (emitter, mut rx) = ChannelEmitter::new();
    let bridge = HostBridge::with_emitter(Arc::new(emitter));
    let engine = ScrapeEngine::new(page, bridge, labelled("main"));

    let started = Instant::now();
    let emitted = engine.spawn_lifecycle_signaler().await.expect("signaler task panicked");
    let elapsed = started.elapsed();

    assert!(!emitted);
    // 2s + 4s between the three checks
    assert!(elapsed >= Duration::from_secs(6), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(7), "elapsed {elapsed:?}");

    let mut warned = false;
    while let Ok(event) = rx.try_recv() {
        assert!(!event.channel.starts_with("page_loaded"), "unexpected {}", event.channel);
        if event.channel == "logger_event" {
            let message = event.payload["message"].as_str().unwrap_or_default();
            warned |= message.starts_with("[WARN]");
        }
    }
    assert!(warned);
}

#[tokio::test(start_paused = true)]
async fn host_attached_late_still_receives_signal() {
    let page = Arc::new(MemoryViewport::new("https://example.com/", "<p>hi</p>"));
    let bridge = HostBridge::new();
    let engine = ScrapeEngine::new(page, bridge.clone(), EngineOptions::default());

    let (emitter, mut rx) = ChannelEmitter::new();
    let handle = engine.spawn_lifecycle_signaler();
    tokio::time::sleep(Duration::from_millis(300)).await;
    bridge.attach(Arc::new(emitter));

    assert!(handle.await.expect("signaler task panicked"));
    let channels: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
        .map(|event| event.channel)
        .filter(|channel| channel != "logger_event")
        .collect();
    assert_eq!(channels, vec!["page_loaded".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn no_host_gives_up_quietly() {
    let page = Arc::new(MemoryViewport::new("https://example.com/", "<p>hi</p>"));
    let engine = ScrapeEngine::new(page, HostBridge::new(), EngineOptions::default());

    let started = Instant::now();
    let emitted = engine.spawn_lifecycle_signaler().await.expect("signaler task panicked");

    assert!(!emitted);
    assert!(started.elapsed() >= Duration::from_millis(5000));
}
