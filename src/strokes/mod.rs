/// Stroke recording and point-in-time snapshots.
pub mod store;
