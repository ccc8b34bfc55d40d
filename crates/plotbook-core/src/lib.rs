//! Core types and trait definitions for Plotbook.
//!
//! This crate has no HTTP or database dependencies. It holds
//! the plot catalog, the grid layout engine, the booking projection, the
//! booking form state machine and the submission flow, all expressed against
//! the [`store::BookingStore`] and [`store::Notifier`] abstractions.

// Native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod booking;
pub mod catalog;
pub mod change;
pub mod error;
pub mod form;
pub mod layout;
pub mod notification;
pub mod plot;
pub mod projection;
pub mod store;
pub mod submit;
pub mod sync;

pub use error::{Error, Result};

#[cfg(test)]
mod memory;
