//! Unit test suite entry point.

mod authoring_tests;
mod effects_tests;
mod scenario_tests;
mod session_tests;
