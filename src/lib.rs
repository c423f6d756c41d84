pub mod chat;
pub mod contacts;
pub mod error;
pub mod mock;
pub mod orchestrator;
pub mod proposal;
pub mod providers;
pub mod state;
pub mod types;
pub mod util;

pub use error::CopilotError;
pub use orchestrator::ProposalOrchestrator;
pub use state::{SessionState, SessionStore};
