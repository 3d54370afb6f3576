//! # Capture and Bank Extraction
//!
//! `mdump -b MPET -x run.mid` prints every MIDAS event bank as text:
//!
//! ```text
//! Bank:MPET Length: 16(I*1)/4(I*4)/4(Type) Type:Unsigned Integer*4
//!    1-> 0x80010000 0x00000000 0x20010000 0x00001f40
//! ```
//!
//! The converter only needs the hex words: `Bank:MPET` holds event word
//! pairs and `Bank:MCPP` holds MCP position words.

mod bank;
mod capture;
mod error;

#[cfg(test)]
mod tests;

pub use bank::extract_bank;
pub use capture::{CaptureBanks, MdumpCapture, DEFAULT_MDUMP_COMMAND};
pub use error::BankError;

/// Marker of event banks
pub const EVENT_BANK: &str = "Bank:MPET";

/// Marker of MCP position banks
pub const POSITION_BANK: &str = "Bank:MCPP";
