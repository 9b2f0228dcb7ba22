//! Backend bridge: command queue from the UI thread to the network worker.

pub mod commands;
pub mod runtime;
