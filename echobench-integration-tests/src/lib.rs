//! End-to-end tests for echobench live under `tests/`.
