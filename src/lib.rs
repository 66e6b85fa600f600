//! NFT scout: discovers newly deployed collections, picks the cheapest mint
//! per contract and submits it on-chain at most once per contract.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod sources;
pub mod storage;

pub use config::ScoutConfig;
pub use lifecycle::Shutdown;
pub use pipeline::Pipeline;
