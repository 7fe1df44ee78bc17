fn main() {
    println!("cargo:rerun-if-env-changed=FIRESENSE_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=FIRESENSE_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=FIRESENSE_COLLECTOR_URL");
    println!("cargo:rerun-if-env-changed=FIRESENSE_DEVICE_ID");

    // Host builds (tests, fuzzing) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
