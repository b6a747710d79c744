use embassy_net::Runner;
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    AuthMethod, ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState,
};

use crate::infrastructure::config;

/// Keeps the station associated, reconnecting after every drop.
#[embassy_executor::task]
pub(crate) async fn wifi_connection_task(mut controller: WifiController<'static>) {
    loop {
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            log::warn!("network: Wi-Fi disconnected");
            Timer::after(Duration::from_millis(2000)).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let client_config = if config::WIFI.password.is_empty() {
                ClientConfig::default()
                    .with_ssid(config::WIFI.ssid.into())
                    .with_auth_method(AuthMethod::None)
            } else {
                ClientConfig::default()
                    .with_ssid(config::WIFI.ssid.into())
                    .with_password(config::WIFI.password.into())
            };
            if let Err(e) = controller.set_config(&ModeConfig::Client(client_config)) {
                log::error!("network: invalid Wi-Fi config: {:?}", e);
                Timer::after(Duration::from_millis(5000)).await;
                continue;
            }
            if let Err(e) = controller.start_async().await {
                log::error!("network: failed to start Wi-Fi: {:?}", e);
                Timer::after(Duration::from_millis(5000)).await;
                continue;
            }
        }

        log::info!("network: connecting to {}", config::WIFI.ssid);
        if let Err(e) = controller.connect_async().await {
            log::warn!("network: failed to connect: {:?}", e);
            Timer::after(Duration::from_millis(5000)).await;
        }
    }
}

/// Background task for running the network stack
#[embassy_executor::task]
pub(crate) async fn network_runner_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}
