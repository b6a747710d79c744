pub(crate) mod mqtt_runtime;
pub(crate) mod network;

pub(crate) use mqtt_runtime::mqtt_runtime_task;
pub(crate) use network::{network_runner_task, wifi_connection_task};
