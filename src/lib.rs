//! Library facade - re-export internal modules so integration
//! tests or external code can use `tcpstat::...`.

pub mod cli;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod interval;
pub mod probe;
pub mod resolve;
pub mod rtt;
pub mod stats;
