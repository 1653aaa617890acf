//! Batch jobs over a docs checkout.
//!
//! Each job reads the content tree described by a [`project::Project`],
//! rewrites what needs rewriting, and returns a report. [`pipeline::build`]
//! chains them in the order CI runs them.

pub mod content;
pub mod convert;
pub mod nav;
pub mod pipeline;
pub mod project;
pub mod rename;
pub mod titles;
