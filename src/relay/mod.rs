pub mod chain;
pub mod charset;
pub mod client;
pub mod errors;
pub mod probe;
pub mod provider;
pub mod timeout;

pub use chain::{ChainSettings, MarkupSource, RelayChain};
pub use client::RelayClient;
pub use errors::{AttemptFailure, RelayError, RetrievalError};
pub use probe::{Accessibility, AccessibilityProbe};
pub use provider::{EnvelopeKind, RelayProvider};
pub use timeout::{TimedOut, TimeoutGuard};
