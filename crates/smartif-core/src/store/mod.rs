// ── Device-state store ──
//
// Authoritative per-key state with synchronous change fan-out.

mod state_store;

pub use state_store::StateStore;
