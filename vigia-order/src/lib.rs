pub mod manager;
pub mod transitions;

pub use manager::OrderManager;
pub use transitions::validate_transition;
