// Chunked, range-indexed loading of well-log curves for a rendering widget
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
