//! Finny: the spend-or-save game core.
//!
//! Ledger and goal mutations over a local SQLite store, plus a dilemma
//! fetcher that always yields a playable round. The chat-platform layer
//! drives everything through [`bot::FinnyBot`].

pub mod advisor;
pub mod bot;
pub mod command;
pub mod completion;
pub mod config;
pub mod dilemma;
pub mod error;
pub mod goals;
pub mod ledger;
pub mod store;
pub mod types;

pub use bot::FinnyBot;
pub use store::FinnyStore;
