//! Unit tests - public API behavior that needs no running backend

mod config_tests;
mod query_model_tests;
