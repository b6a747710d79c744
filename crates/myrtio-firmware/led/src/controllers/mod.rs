mod mqtt;

use esp_hal::gpio::Output;
use myrtio_mqtt::runtime::MqttModule;

use mqtt::init_led_module;

pub(crate) fn init_controllers(led: Output<'static>) -> &'static mut dyn MqttModule {
    init_led_module(led)
}
