//! Integration tests module

mod cycle_tests;
#[cfg(unix)]
mod ssh_executor_tests;
