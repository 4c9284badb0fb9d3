// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod headless_renderer;
pub mod http_log_repository;
pub mod response_adapter;
pub mod wire;
