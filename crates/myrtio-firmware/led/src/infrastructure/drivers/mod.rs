mod led;
mod network;

pub(crate) use led::init_led_output;
pub(crate) use network::init_network_stack;
