//! Property and scenario tests for the diff / codec / apply pipeline.

mod properties;
mod scenarios;
