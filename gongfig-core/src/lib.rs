pub mod catalog;
pub mod certificate;
pub mod config;
pub mod consumer;
pub mod document;
pub mod error;
pub mod plugin;
pub mod resource;
pub mod route;
pub mod service;
pub mod upstream;

pub use catalog::{CATALOG, ResourceDescriptor, ResourceKind};
pub use config::SyncConfig;
pub use document::{ConfigDocument, DocumentFormat};
pub use error::SyncError;
pub use resource::{CatalogEntity, Resource, ResourceInstance};
