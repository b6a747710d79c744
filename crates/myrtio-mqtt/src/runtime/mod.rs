//! MQTT Runtime Module
//!
//! Drives one MQTT session on behalf of an application module.
//!
//! # Overview
//!
//! The runtime connects, reports every lifecycle change and every inbound
//! message as a [`SessionEvent`], and performs all network I/O itself. Events
//! are delivered one at a time, in the order they happened; the module's
//! handler runs to completion before the next event is produced.
//!
//! # Object-Safe Design
//!
//! [`MqttModule`] is dyn-compatible, so a module can live in a `StaticCell`
//! and be handed to an Embassy task as `&'static mut dyn MqttModule` without
//! generic parameters leaking into the task signature.
//!
//! # Subscribing
//!
//! Modules never perform async I/O directly. They queue subscriptions through
//! [`SessionControl`], which assigns the packet identifier immediately; the
//! runtime sends the queued SUBSCRIBE packets once the handler returns.

pub(crate) mod event;
pub(crate) mod event_loop;
pub(crate) mod outbox;
pub(crate) mod traits;

pub use event::{SessionError, SessionEvent};
pub use event_loop::MqttRuntime;
pub use outbox::{OutboxFull, SessionControl, SubscriptionOutbox, SubscriptionRequest};
pub use traits::MqttModule;

// Re-export Publish for convenient use in modules
pub use crate::packet::Publish;
