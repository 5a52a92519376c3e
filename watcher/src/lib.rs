//! # Watcher: executes BTC proposals accepted by the DAO
//!
//! When pointed at a node and the DAO contract,
//! this service polls for `AcceptedBTCProposalEvent` logs
//! and hands every accepted proposal to a transfer executor.
//! It is driven through the five operations of its actor interface.
#![forbid(missing_docs)]

pub mod chain_client;
pub mod config;
pub mod event;
pub mod interface;
pub mod state;
pub mod transfer;
pub mod watcher;
