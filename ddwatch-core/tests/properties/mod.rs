//! Property-based tests module

mod cycle_result_tests;
mod parser_tests;
mod threshold_tests;
