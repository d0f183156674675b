// tests/primitives/fixtures/mod.rs
