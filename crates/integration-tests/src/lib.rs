//! Integration tests for the Meridian store API.
//!
//! The tests in `tests/` drive the real router in-process with
//! `tower::ServiceExt::oneshot`. The database pool is created lazily, so
//! every covered path must reject the request before any query runs; this
//! keeps the suite independent of a running `PostgreSQL` instance.
