//! Events domain module.
//!
//! The event resource: record shape, form validation, listing filters.
//!
//! Access decisions (who sees which events, who may delete them) live in
//! `evently-auth`; persistence lives in `evently-store`. This crate is pure
//! data and rules.

pub mod event;
pub mod filter;
pub mod validate;

pub use event::{Event, EventStatus};
pub use filter::{DateFilter, EventFilter, Visibility};
pub use validate::{EventInput, ValidatedEvent, validate_create, validate_update};
