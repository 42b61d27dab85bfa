//! Multi-criterion screening over a ranked share universe.
//!
//! A [`Universe`] holds the derived valuations for one market snapshot,
//! annotated once with the composite rank at construction time. Screens are
//! read-only passes over it: single-criterion filters via
//! [`Universe::filter_by`], or full conjunctive screens with ordering and a
//! result cap via [`Universe::screen`].

pub mod query;
pub mod universe;

pub use query::{Criterion, ScreenRequest, SortSpec, TickerScope};
pub use universe::Universe;
