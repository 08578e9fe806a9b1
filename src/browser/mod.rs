//! Interactive repository browser.
//!
//! Turns a flat repository listing into a paginated drill-down keyboard:
//! - `tree`: children index over the flat listing
//! - `pager`: fixed-size pages and prev/next availability
//! - `session` / `store`: per-chat navigation state and its storage
//! - `view`: pure keyboard rendering
//! - `navigator`: event reduction and effect execution through the gateways

mod action;
mod gateway;
mod navigator;
mod pager;
mod session;
mod store;
mod tree;
mod view;
#[cfg(test)]
mod tests;

// Re-exports
pub use action::Action;
pub use gateway::{DeliveryGateway, RetrievalGateway};
pub use navigator::{InboundEvent, Navigator};
pub use pager::DEFAULT_PAGE_SIZE;
pub use store::MemorySessionStore;
pub use tree::Entry;
#[allow(unused_imports)]
pub use view::{Button, ViewDescriptor};
