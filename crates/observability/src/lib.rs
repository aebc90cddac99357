//! Tracing/logging setup shared by the native binaries.

/// Initialize JSON logging for long-running processes.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize human-readable logging for interactive tools.
pub fn init_pretty() {
    tracing::init_pretty();
}

/// Tracing configuration (filters, formatters).
pub mod tracing;
