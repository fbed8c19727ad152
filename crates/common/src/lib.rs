pub mod config;
pub mod error;
pub mod reasoning;
pub mod transport;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use reasoning::{AnalysisRequest, ReasoningClient};
pub use transport::ChatTransport;
pub use types::*;
