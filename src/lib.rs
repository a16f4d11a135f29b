//! # trendswipe
//!
//! Aggregates trend-signal images from curated fashion, subculture and retail
//! sources and serves them in batches to a swiping client.
//!
//! ## Architecture
//!
//! ```text
//! Sources → Fetcher → Extract → Filter → Dedupe → Cache → Batches → HTTP
//! ```
//!
//! - [`fetcher`]: HTTP client with browser-like headers and per-call timeouts
//! - [`extract`]: Feed and page extraction, image discovery
//! - [`filter`]: Topical relevance and image URL normalization
//! - [`cache`]: Snapshot builds, single-flight refresh and pagination
//! - [`server`]: JSON API built with axum
//!
//! ## Quick Start
//!
//! ```bash
//! # List the source registry
//! trendswipe sources
//!
//! # Run one build pass
//! trendswipe build
//!
//! # Serve the API
//! trendswipe serve --port 5000
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// fetcher, extractors, cache builder, refresher.
pub mod app;

/// Snapshot building, storage, refresh scheduling and batch paging.
pub mod cache;

/// Command-line interface using clap.
///
/// - `serve` - Run the HTTP API
/// - `build` - Run one build pass
/// - `sources` - List the configured sources
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/trendswipe/config.toml`, supporting server, cache,
/// fetch and relevance settings plus a source registry override.
pub mod config;

/// Core domain models.
///
/// - [`SourceDescriptor`](domain::SourceDescriptor): one upstream source
/// - [`CandidateImage`](domain::CandidateImage): an image with SHA-256 based ID
/// - [`Snapshot`](domain::Snapshot): one published generation of images
pub mod domain;

/// Per-source extraction of candidate images.
pub mod extract;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for fetching documents
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Relevance filtering and image URL normalization.
pub mod filter;

/// The HTTP API.
pub mod server;
