// Domain layer - well-log value types and pure merge logic
pub mod curve;
pub mod log_stream;
pub mod range;
pub mod rows;
pub mod series;
pub mod viewport;
