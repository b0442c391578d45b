//! Soft navigation core.
//!
//! Swaps a page's content region in place instead of reloading the whole
//! document. The [`NavigationController`] drives each transition against
//! the host's ports (see [`softnav_types::backend`]); the [`FetchPipeline`]
//! turns a path into a content fragment; the [`ContentCache`] keeps every
//! fragment seen this session.

pub mod cache;
pub mod controller;
pub mod history;
pub mod html;
pub mod link;
pub mod pipeline;

#[cfg(test)]
mod test_utils;

pub use cache::ContentCache;
pub use controller::{ControllerOptions, NavOutcome, NavState, NavigationController};
pub use history::{HistoryEntry, SessionHistory};
pub use html::ContentSelector;
pub use link::LinkActivation;
pub use pipeline::{DocumentSource, FetchPipeline, Page};
