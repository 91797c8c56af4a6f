//! Handler-Module des Message-Dispatchers
//!
//! Jeder Handler ist eine freie Funktion die den geteilten `RelayState`
//! mutiert und die abgeleiteten Broadcasts verschickt.

pub mod call_handler;
pub mod chat_handler;
pub mod session_handler;
