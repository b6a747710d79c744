//! LED command module
//!
//! Wraps the GPIO output in a `CommandDispatcher` that lives for the whole
//! program and is handed to the MQTT task as a trait object.

use esp_hal::gpio::Output;
use myrtio_led_control::{CommandDispatcher, DispatcherConfig, Topic};
use myrtio_mqtt::runtime::MqttModule;
use static_cell::StaticCell;

use crate::infrastructure::config;

pub(crate) type LedModule = CommandDispatcher<Output<'static>>;

static LED_MODULE: StaticCell<LedModule> = StaticCell::new();

pub(crate) fn init_led_module(led: Output<'static>) -> &'static mut dyn MqttModule {
    let dispatcher_config = DispatcherConfig::new(Topic::new(config::LED.topic));
    // GPIO writes cannot fail on this chip
    let Ok(dispatcher) = LedModule::new(dispatcher_config, led);
    log::info!("led: listening on {}", dispatcher.config().topic);

    LED_MODULE.uninit().write(dispatcher)
}
