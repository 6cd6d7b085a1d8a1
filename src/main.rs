//! Thin binary wrapper: set up logging, open the ghost window.
//!
//! Run with `RUST_LOG=info cargo run` to see lifecycle logs.

fn main() -> anyhow::Result<()> {
    // Logging is configured here so the library stays unopinionated.
    env_logger::init();
    ghostly::run_app()
}
