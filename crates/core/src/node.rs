//! Caller-facing query operation and host item assembly.
//!
//! [`process`] is the single entry point: validate, run the engine,
//! normalize. [`QueryNode`] adapts it to a host pipeline that deals in
//! [`Item`]s and reads its two parameters by name.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::QueryEngine;
use crate::error::ProcessingError;
use crate::normalize::{normalize, NormalizedRecords};
use crate::request::{Payload, QueryRequest};

/// One unit of data flowing through the host pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub json: Value,
}

impl From<Value> for Item {
    fn from(json: Value) -> Self {
        Self { json }
    }
}

/// Node parameters as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeParameters {
    /// Input payload, either raw JSON text or a decoded value.
    pub json_data: Payload,
    /// Query statement passed to the engine.
    pub zquery: String,
}

/// Run `query` against `payload` and return the normalized records.
///
/// Every failure, from validation through parsing, is wrapped once into a
/// [`ProcessingError`]. Invalid input fails before the engine is invoked.
pub async fn process<E: QueryEngine>(
    engine: &E,
    payload: Payload,
    query: &str,
) -> Result<NormalizedRecords, ProcessingError> {
    let request = QueryRequest::new(payload, query)?;
    let input = request.serialized_payload();
    tracing::debug!(query = request.query(), input_len = input.len(), "Executing query");

    let outcome = engine.run(&input, request.query()).await?;
    let records = normalize(&outcome.stdout)?;

    tracing::info!(
        records = records.len(),
        duration_ms = outcome.duration_ms,
        "Query completed",
    );
    Ok(records)
}

/// Package records as output items, one per record, in order.
///
/// With upstream items present the results are merged into the stream;
/// without any they are created fresh. Both produce `{ "json": record }`.
pub fn assemble_items(upstream: &[Item], records: NormalizedRecords) -> Vec<Item> {
    if upstream.is_empty() {
        tracing::debug!(records = records.len(), "Creating items from results");
    } else {
        tracing::debug!(
            upstream = upstream.len(),
            records = records.len(),
            "Merging results with input items",
        );
    }
    records.into_iter().map(Item::from).collect()
}

/// Host-facing node wrapping a [`QueryEngine`].
#[derive(Debug, Clone, Default)]
pub struct QueryNode<E> {
    engine: E,
}

impl<E: QueryEngine> QueryNode<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Execute once for the whole batch of upstream items.
    pub async fn execute(
        &self,
        upstream: &[Item],
        params: NodeParameters,
    ) -> Result<Vec<Item>, ProcessingError> {
        let records = process(&self.engine, params.json_data, &params.zquery).await?;
        let items = assemble_items(upstream, records);
        tracing::debug!(items = items.len(), "Returning output items");
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
