/// Describe/summarize client and request builders.
pub mod client;
/// Tolerant response field extraction.
pub mod extract;
/// Stage failure values.
pub mod failure;
/// HTTP seam and its implementations.
pub mod transport;
