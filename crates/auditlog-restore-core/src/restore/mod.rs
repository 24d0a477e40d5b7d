//! Restore engine module.

pub mod engine;
pub mod plan;
pub mod selection;
pub mod session;

pub use engine::RestoreEngine;
pub use plan::RestorePlan;
pub use selection::pattern_match;
pub use session::RestoreSession;
