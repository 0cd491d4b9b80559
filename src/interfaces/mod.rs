//! Inbound and outbound adapters used by the command-line binary.

pub mod csv;
pub mod jsonl;
