//! The robustness evaluation harness (§4.10): dataset discovery, channel
//! modifications, and the parallel encode/modify/decode/score sweep.

pub mod dataset;
pub mod modifications;
pub mod pipeline;
pub mod row;

pub use dataset::{discover, DatasetFile};
pub use modifications::Modification;
pub use pipeline::{run, EvalConfig};
pub use row::EvalRow;
