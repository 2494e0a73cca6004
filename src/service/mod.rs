pub mod recap_service;
pub mod session;

pub use recap_service::{RecapService, SaveOutcome, WorkRecapSummary};
pub use session::{LoadedWork, RecapSession};
