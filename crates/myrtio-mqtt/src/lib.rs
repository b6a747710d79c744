//! # Async MQTT Client for Embedded Systems
//!
//! `myrtio-mqtt` is a `no_std` compatible, asynchronous MQTT client designed for embedded
//! systems, built upon the [Embassy](https://embassy.dev/) async ecosystem.
//!
//! ## Core Features
//!
//! - **`no_std` & `no_alloc`:** Runs on bare-metal microcontrollers. Buffers are fixed-size
//!   arrays and `heapless` collections.
//! - **Fully Async:** Built with `async/await` on top of `embassy-time` and `embassy-net`.
//! - **MQTT v3.1.1 and v5 Support:** Protocol level 4 by default, level 5 with the `v5` feature.
//! - **Transport Agnostic:** The `MqttTransport` trait allows the client to run over any
//!   reliable, ordered byte stream. `TcpTransport` covers `embassy-net` TCP sockets.
//! - **QoS 0 & 1:** "At most once" and "at least once" delivery.
//!
//! ## Architecture
//!
//! ### 1. Direct Client Usage
//!
//! ```ignore
//! let mut client = MqttClient::<_, 4, 512>::new(transport, options);
//! client.connect().await?;
//! client.subscribe("device/cmd", QoS::AtLeastOnce).await?;
//! loop {
//!     if let Some(MqttEvent::Publish(msg)) = client.poll().await? {
//!         // ...
//!     }
//! }
//! ```
//!
//! ### 2. Runtime with a Module
//!
//! `MqttRuntime` owns the session lifecycle and turns everything that happens on the wire
//! into a closed set of [`runtime::SessionEvent`]s delivered, one at a time and in order,
//! to an [`runtime::MqttModule`]. Modules never perform async I/O: subscriptions are queued
//! through [`runtime::SessionControl`] and flushed by the runtime once the module returns.

#![no_std]

pub mod client;
pub mod error;
pub mod packet;
pub mod runtime;
pub mod transport;
pub mod util;

// Re-export key types for easier access at the crate root.
pub use client::{MqttClient, MqttEvent, MqttOptions};
pub use packet::QoS;
pub use transport::TcpTransport;
