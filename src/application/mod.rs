// Application layer - chunk loading, scheduling and polling use cases
pub mod chunk_loader;
pub mod chunk_scheduler;
pub mod curve_renderer;
pub mod in_flight;
pub mod live_poller;
pub mod log_repository;
pub mod log_session;
pub mod range_tracker;
pub mod series_store;
pub mod stream_catalog;
pub mod viewport_watcher;

#[cfg(test)]
pub(crate) mod testing;
