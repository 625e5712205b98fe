//! Core domain of the Coach practice session manager.
//!
//! For every problem a user visits, Coach keeps one code buffer per language,
//! one shared transcript and the last chosen language, and persists them so
//! that they survive restarts and fast navigation between problems.

pub mod cache;
pub mod error;
pub mod gateway;
pub mod language;
pub mod problem;
pub mod session;
pub mod skill;
pub mod store;
pub mod tables;
pub mod transcript;

// Re-export common types
pub use error::CoachError;
pub use gateway::{BackendGateway, GatewayAction, GatewayError, GatewayRequest, GatewayResponse};
pub use language::Language;
pub use problem::{Problem, ProblemCatalog};
pub use session::{ActiveSession, SessionController, SessionPhase, SessionSettings};
pub use skill::SkillLevel;
pub use transcript::{Author, Transcript, Turn};
