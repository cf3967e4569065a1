//! Archive vault integration tests.

mod fallback;
mod transfer;
mod concurrency;
