//! Shared networking helpers for MyrtIO firmware.
#![no_std]

pub mod broker;
pub mod net;
