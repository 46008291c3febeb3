pub mod config;
pub mod logging;

pub mod api;
pub mod batch;
pub mod checksum;
pub mod downloader;
pub mod fetcher;
pub mod manifest;
pub mod pipeline;
pub mod progress;
pub mod storage;
pub mod verify;

pub use api::{ApiClient, ModFile};
pub use manifest::{Manifest, ModReference};
pub use pipeline::{SyncOptions, SyncReport};
