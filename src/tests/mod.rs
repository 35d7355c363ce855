// Test modules for song-rewriter crate
//
// Each source module has a corresponding test file that focuses on business
// logic verification. HTTP-backed providers and the web router are covered by
// the integration tests under tests/.

// Test helper utilities
pub mod helpers;

// Error records and the append log
pub mod log_store;

pub mod prompt;
pub mod retry;

pub mod web_pages;
