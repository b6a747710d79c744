use esp_hal::gpio::{Level, Output, OutputConfig, OutputPin};

/// Configures the LED pin as a push-pull output, driven low.
pub(crate) fn init_led_output(pin: impl OutputPin + 'static) -> Output<'static> {
    let output = Output::new(pin, Level::Low, OutputConfig::default());
    log::info!("led: output configured, level low");
    output
}
