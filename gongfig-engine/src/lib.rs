pub mod client;
pub mod compose;
pub mod engine;
pub mod fetch;
pub mod flush;
pub mod import;
pub mod persist;
pub mod pool;
pub mod remap;

pub use client::{AdminClient, AdminTransport, HttpTransport, Reply};
pub use engine::SyncEngine;
pub use flush::FlushReport;
pub use import::ImportReport;
pub use remap::IdMap;
