pub mod fallback;
pub mod habits;
pub mod plan;
