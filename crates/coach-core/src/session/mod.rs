//! Session domain module.
//!
//! # Module Structure
//!
//! - `active`: The transient state of the displayed problem (`ActiveSession`)
//! - `controller`: Switching, debouncing and persistence (`SessionController`)
//!
//! # Usage
//!
//! ```
//! use coach_core::problem::ProblemCatalog;
//! use coach_core::session::{SessionController, SessionSettings};
//! use coach_core::store::MemoryStore;
//!
//! let mut controller =
//!     SessionController::new(MemoryStore::new(), ProblemCatalog::default(), SessionSettings::default());
//! let ticket = {
//!     controller.switch_to("two-sum").unwrap();
//!     controller.on_code_change("def solve(): pass").unwrap()
//! };
//! assert!(controller.on_debounce_elapsed(ticket));
//! ```

mod active;
mod controller;

// Re-export public API
pub use active::ActiveSession;
pub use controller::{
    DEFAULT_DEBOUNCE, DebounceTicket, SessionController, SessionPhase, SessionSettings,
};
