//! Hardware, network and task plumbing around the LED dispatcher

pub(crate) mod config;
pub(crate) mod drivers;
pub(crate) mod tasks;
