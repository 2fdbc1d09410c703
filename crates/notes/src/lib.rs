//! Concurrency notes.
//!
//! Each module demonstrates one primitive in isolation and returns what
//! happened instead of printing it, so the behavior can be asserted on:
//! - [`channels`]: rendezvous and bounded channels
//! - [`scheduling`]: independent tasks yielding to each other
//! - [`select`]: a single choice between a ready read and a blocking write

pub mod channels;
pub mod errors;
pub mod scheduling;
pub mod select;

pub use errors::NoteError;
