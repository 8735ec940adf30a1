//! State module for tracking worker progress and rate budgets
//!
//! # Components
//!
//! - `WorkerState`: Tracks what each worker in the pool is doing
//! - `RateWindow`: Admission timestamps inside the trailing rate window

mod rate_window;
mod worker_state;

// Re-export main types
pub use rate_window::RateWindow;
pub use worker_state::WorkerState;
