fn main() {
    // WIFI_SSID, WIFI_PASSWORD, MQTT_BROKER_URL, ... may come from a .env file
    dotenv_build::output(dotenv_build::Config::default()).unwrap();

    let build_version = chrono::Utc::now().format("%Y%m%d%H%M%S");
    println!("cargo:rustc-env=BUILD_VERSION={build_version}");

    println!("cargo:rustc-link-arg=-Tlinkall.x");
    println!("cargo:rerun-if-changed=.env");
}
