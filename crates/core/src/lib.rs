//! Run `zq` queries over JSON payloads and normalize the results.
//!
//! The flow is request validation ([`request`]), engine invocation
//! ([`engine`]), and output normalization ([`normalize`]), tied together
//! by [`node::process`].

pub mod config;
pub mod engine;
pub mod error;
pub mod node;
pub mod normalize;
pub mod request;

pub use config::EngineConfig;
pub use engine::zq::ZqEngine;
pub use engine::{ProcessOutcome, QueryEngine};
pub use error::{ProcessingError, QueryError};
pub use node::{assemble_items, process, Item, NodeParameters, QueryNode};
pub use normalize::{normalize, NormalizedRecords};
pub use request::{Payload, QueryRequest};
