//! Subcommands of `btc-dao`

pub mod create;
pub mod init;
pub mod proposals;
pub mod utils;
pub mod vote;
