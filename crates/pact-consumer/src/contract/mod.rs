//! Contract document model.
//!
//! - `interaction`: builder types used while describing a test
//! - `pact`: the consumer/provider container
//! - `types`: serde wire types of the written contract

mod interaction;
mod pact;
mod types;

pub use interaction::{Interaction, Method, Request, Response};
pub use pact::Pact;
pub use types::{
    InteractionRecord, MatchingRules, Metadata, PactDocument, Pacticipant, ProviderState,
    RequestRecord, ResponseRecord, VersionInfo, PACT_SPECIFICATION_VERSION,
};
