//! Remote control of a single digital output over MQTT.
//!
//! [`CommandDispatcher`] watches one topic and turns the payloads `"1"` and
//! `"0"` into pin levels. It plugs into `myrtio-mqtt` as an
//! [`MqttModule`](myrtio_mqtt::runtime::MqttModule):
//!
//! ```ignore
//! let config = DispatcherConfig::new(Topic::new("/home/desk/led"));
//! let mut dispatcher = CommandDispatcher::new(config, pin)?;
//!
//! let mut runtime: MqttRuntime<_, _, 1, 1024> = MqttRuntime::new(client, &mut dispatcher);
//! runtime.run().await?;
//! ```
#![no_std]

mod command;
mod dispatcher;
mod reaction;
mod topic;

pub use command::{Command, PinLevel};
pub use dispatcher::{CommandDispatcher, DispatcherConfig};
pub use reaction::{Diagnostic, Reaction};
pub use topic::{DEFAULT_LED_TOPIC, Topic};
