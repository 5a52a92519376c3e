#![forbid(missing_docs)]

//! BTC DAO CLI lists the BTC proposals of the DAO contract, creates new
//! ones and votes on them through a wallet's JSON-RPC endpoint.

pub mod commands;
pub mod config;
