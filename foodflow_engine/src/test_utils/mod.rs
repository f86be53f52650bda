//! Helpers for setting up throwaway databases in tests. Enabled with the `test_utils` feature.

pub mod prepare_env;
