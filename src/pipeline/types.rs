//! Values handed between stages.

use alloy::primitives::{Address, Bytes, TxHash};
use thiserror::Error;

use crate::storage::ErrorKind;

/// The cheapest candidate of one collection, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedItem {
    pub collection_name: String,
    pub contract_address: Address,
    /// Minimum parsed unit count among the collection's candidates.
    pub unit_count: u64,
    pub destination: Address,
    pub payload: Bytes,
}

/// Why a collection produced no selected item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no items provided")]
    NoItems,

    #[error("invalid NFT count: {value:?}")]
    InvalidUnitCount { value: String },
}

impl SelectionError {
    /// Audit tag for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SelectionError::NoItems => ErrorKind::NoItems,
            SelectionError::InvalidUnitCount { .. } => ErrorKind::InvalidUnitCount,
        }
    }
}

/// Terminal state of one selected item in the submission stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Broadcast accepted and recorded.
    Submitted(TxHash),
    /// A transaction was already recorded for the contract.
    Duplicate,
    /// Abandoned at the tagged step.
    Failed(ErrorKind),
    /// Shutdown fired before the item finished.
    Cancelled,
}
