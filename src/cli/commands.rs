use std::collections::BTreeMap;

use crate::app::{AppContext, Result, SwipeError};
use crate::cache::SnapshotBuilder;
use crate::config::interval::format_interval;
use crate::domain::{Snapshot, SourceKind};
use crate::server;

pub async fn serve(ctx: &AppContext) -> Result<()> {
    let cache = &ctx.config.cache;
    tracing::info!(
        sources = ctx.sources.len(),
        max_images = cache.max_images,
        refresh_interval = %format_interval(cache.refresh_interval),
        "Starting trendswipe"
    );

    if cache.warm_on_start {
        tracing::info!("Running initial build in the background...");
        ctx.refresher.force_refresh().await;
    }

    if let Some(every) = cache.check_interval() {
        ctx.refresher.spawn_staleness_check(every);
    }

    server::serve(ctx.api_state(), &ctx.config.server.bind_addr()).await
}

/// One build pass, printed as a summary or as JSON.
pub async fn build(ctx: &AppContext, json: bool) -> Result<()> {
    if !json {
        println!("Reading {} sources...", ctx.sources.len());
    }

    let snapshot = ctx.builder.build().await;

    if json {
        let out = serde_json::to_string_pretty(snapshot.images())
            .map_err(|e| SwipeError::Other(format!("Failed to encode images: {}", e)))?;
        println!("{}", out);
    } else {
        print_summary(&snapshot);
    }

    Ok(())
}

fn print_summary(snapshot: &Snapshot) {
    if snapshot.is_empty() {
        println!("No images collected");
        return;
    }

    let mut by_source: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_layer: BTreeMap<&str, usize> = BTreeMap::new();
    for image in snapshot.images() {
        *by_source.entry(image.source_label.as_str()).or_default() += 1;
        *by_layer.entry(image.layer_tag.as_str()).or_default() += 1;
    }

    for (source, count) in &by_source {
        println!("  {:>3}  {}", count, source);
    }

    let layers: Vec<String> = by_layer
        .iter()
        .map(|(layer, count)| format!("{} {}", layer, count))
        .collect();
    println!(
        "Build complete: {} images ({})",
        snapshot.len(),
        layers.join(", ")
    );
}

pub fn list_sources(ctx: &AppContext) -> Result<()> {
    if ctx.sources.is_empty() {
        println!("No sources configured");
        return Ok(());
    }

    for source in ctx.sources.iter() {
        let kind = match source.kind {
            SourceKind::Feed => "feed",
            SourceKind::Page => "page",
        };
        println!(
            "[{}] {} ({}, {}, up to {})\n  {}",
            source.layer, source.label, source.category, kind, source.quota, source.endpoint
        );
    }

    println!("{} sources", ctx.sources.len());
    Ok(())
}
