//! Integration tests for the path store

mod round_trip;
mod snapshot_merge;
mod support;
mod transitions;
