pub(crate) struct WifiConfig {
    pub ssid: &'static str,
    /// Empty for open networks
    pub password: &'static str,
}

pub(crate) struct MqttConfig {
    pub broker_url: &'static str,
    pub client_id: &'static str,
    pub keep_alive_secs: u64,
}

pub(crate) struct DeviceConfig {
    pub hostname: &'static str,
}

pub(crate) struct LedConfig {
    pub topic: &'static str,
}

const fn env_or(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(value) => value,
        None => default,
    }
}

pub(crate) const BUILD_VERSION: &str = env!("BUILD_VERSION");

pub(crate) const WIFI: WifiConfig = WifiConfig {
    ssid: env!("WIFI_SSID"),
    password: env!("WIFI_PASSWORD"),
};

pub(crate) const MQTT: MqttConfig = MqttConfig {
    broker_url: env!("MQTT_BROKER_URL"),
    client_id: env_or(option_env!("MQTT_CLIENT_ID"), "myrtio-led-esp32"),
    keep_alive_secs: 15,
};

pub(crate) const DEVICE: DeviceConfig = DeviceConfig {
    hostname: "myrtio-led-esp32",
};

pub(crate) const LED: LedConfig = LedConfig {
    topic: env_or(
        option_env!("LED_TOPIC"),
        myrtio_led_control::DEFAULT_LED_TOPIC,
    ),
};

#[macro_export]
macro_rules! led_gpio {
    ($p:expr) => {
        $p.GPIO2
    };
}
