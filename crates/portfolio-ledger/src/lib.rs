//! Position tracking on top of a market snapshot.
//!
//! A [`Holding`] ties one share's valuation to its cost basis and trade
//! history; a [`Portfolio`] aggregates holdings and answers the usual
//! money questions (invested total, equity, return, position weights).

pub mod models;
pub mod portfolio;

pub use models::{Holding, Operation, OperationKind};
pub use portfolio::Portfolio;
