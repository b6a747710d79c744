#![no_std]
#![no_main]
#![feature(type_alias_impl_trait)]

mod controllers;
mod infrastructure;

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};
use myrtio_core::broker::BrokerUrl;

use crate::controllers::init_controllers;
use crate::infrastructure::config;
use crate::infrastructure::drivers::{init_led_output, init_network_stack};
use crate::infrastructure::tasks::{mqtt_runtime_task, network_runner_task, wifi_connection_task};

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    log::info!("startup, build {}", config::BUILD_VERSION);

    // Initialize hardware
    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    // Wi-Fi needs the heap (64 + 32 KB)
    esp_alloc::heap_allocator!(
        #[unsafe(link_section = ".dram2_uninit")] size: 64 * 1024
    );
    esp_alloc::heap_allocator!(size: 32 * 1024);

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let broker = BrokerUrl::parse(config::MQTT.broker_url).expect("Invalid MQTT_BROKER_URL");

    // The LED is off before any session activity
    let led = init_led_output(led_gpio!(peripherals));
    let mqtt_module = init_controllers(led);

    // Initialize network stack and spawn network tasks
    let (stack, runner, controller) = init_network_stack(peripherals.WIFI);
    spawner.spawn(wifi_connection_task(controller)).ok();
    spawner.spawn(network_runner_task(runner)).ok();

    let ip = myrtio_core::net::wait_for_connection(stack).await;
    log::info!("network: got address {}", ip.address);

    spawner
        .spawn(mqtt_runtime_task(stack, mqtt_module, broker))
        .ok();

    loop {
        Timer::after(Duration::from_secs(5)).await;
    }
}
