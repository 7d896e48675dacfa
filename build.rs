fn main() {
    // Network settings are baked in with `option_env!`; rebuild when they change.
    for var in [
        "SMARTGATE_WIFI_SSID",
        "SMARTGATE_WIFI_PASSWORD",
        "SMARTGATE_MQTT_URL",
        "SMARTGATE_MQTT_USER",
        "SMARTGATE_MQTT_PASSWORD",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
