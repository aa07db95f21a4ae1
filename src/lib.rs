//! Gateway between an RF12demo radio receiver and a Domoticz server, plus
//! the helpers used to display node records.

pub mod config;
pub mod display;
pub mod domoticz;
pub mod gateway;
pub mod node;
pub mod reader;
pub mod registry;
pub mod rf12demo;
