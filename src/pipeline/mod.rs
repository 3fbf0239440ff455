/// Phases, outcomes, and observer notifications.
pub mod events;
/// Single-flight capture, describe, summarize sequencing.
pub mod orchestrator;
