//! Derived-state computations shared by every rendering surface.
//!
//! Form previews, printable documents and list/board summaries all
//! recompute status and totals from the stored entity through these
//! functions, so there is exactly one formula per derived value. All
//! functions are pure; "today" is always passed in by the caller.

pub mod amc;
pub mod billing;
pub mod date_math;
pub mod jobs;
pub mod leave;
pub mod rma;
pub mod warranty;
