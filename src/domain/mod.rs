//! Domain model: transactions, accounts, currency conversion, merchant
//! enrichment, decisions, and the ports the engine talks through.

pub mod account;
pub mod currency;
pub mod decision;
pub mod enrichment;
pub mod ports;
pub mod transaction;
