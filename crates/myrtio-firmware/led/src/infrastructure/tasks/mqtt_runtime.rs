//! MQTT Runtime Task
//!
//! Owns the broker connection. Every failed session is followed by a 2 s pause
//! and a fresh TCP connection, which delivers `Connected` to the module again.

use embassy_net::Stack;
use embassy_net::tcp::TcpSocket;
use embassy_time::{Duration, Timer};
use myrtio_core::broker::BrokerUrl;
use myrtio_core::net::resolve_host;
use myrtio_mqtt::runtime::{MqttModule, MqttRuntime};
use myrtio_mqtt::{
    client::{MqttClient, MqttOptions},
    transport::TcpTransport,
};

use crate::infrastructure::config;

const MQTT_MAX_TOPICS: usize = 2;
const MQTT_BUF_SIZE: usize = 512;
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

#[embassy_executor::task]
pub(crate) async fn mqtt_runtime_task(
    stack: Stack<'static>,
    module: &'static mut dyn MqttModule,
    broker: BrokerUrl<'static>,
) {
    loop {
        if run_mqtt_client(stack, module, broker).await.is_err() {
            log::info!("mqtt: reconnecting in 2s");
            Timer::after(RECONNECT_DELAY).await;
        }
    }
}

async fn run_mqtt_client(
    stack: Stack<'static>,
    module: &mut dyn MqttModule,
    broker: BrokerUrl<'static>,
) -> Result<(), ()> {
    let mut rx_buffer = [0u8; 1024];
    let mut tx_buffer = [0u8; 1024];

    let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(60)));

    let broker_addr = resolve_host(stack, broker.host).await.map_err(|e| {
        log::error!("mqtt: cannot resolve {}: {}", broker.host, e);
    })?;

    log::info!("mqtt: connecting to {} ({})", broker, broker_addr);
    socket
        .connect((broker_addr, broker.port))
        .await
        .map_err(|e| {
            log::error!("mqtt: TCP connect failed: {:?}", e);
        })?;

    let transport = TcpTransport::new(socket, Duration::from_secs(30));
    let options = MqttOptions::new(config::MQTT.client_id)
        .with_keep_alive(Duration::from_secs(config::MQTT.keep_alive_secs));
    let mqtt: MqttClient<_, MQTT_MAX_TOPICS, MQTT_BUF_SIZE> = MqttClient::new(transport, options);

    let mut runtime: MqttRuntime<'_, _, &mut dyn MqttModule, MQTT_MAX_TOPICS, MQTT_BUF_SIZE> =
        MqttRuntime::new(mqtt, module);

    runtime.run().await.map_err(|e| {
        log::error!("mqtt: {}", e);
    })
}
