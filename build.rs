use std::env;

fn main() {
    // Read LoRaWAN credentials from environment variables (optional)
    // These are used as default values when parameter storage is empty

    // Device EUI
    if let Ok(dev_eui) = env::var("LORA_DEV_EUI") {
        println!("cargo:rustc-env=LORA_DEV_EUI={}", dev_eui);
        println!("cargo:warning=Using LORA_DEV_EUI from environment: {}", dev_eui);
    } else {
        println!("cargo:rustc-env=LORA_DEV_EUI=");
    }

    // Join EUI (AppEUI)
    if let Ok(join_eui) = env::var("LORA_JOIN_EUI") {
        println!("cargo:rustc-env=LORA_JOIN_EUI={}", join_eui);
        println!(
            "cargo:warning=Using LORA_JOIN_EUI from environment: {}",
            join_eui
        );
    } else {
        println!("cargo:rustc-env=LORA_JOIN_EUI=");
    }

    // AppKey
    if let Ok(app_key) = env::var("LORA_APP_KEY") {
        println!("cargo:rustc-env=LORA_APP_KEY={}", app_key);
        println!("cargo:warning=Using LORA_APP_KEY from environment (hidden)");
    } else {
        println!("cargo:rustc-env=LORA_APP_KEY=");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=LORA_DEV_EUI");
    println!("cargo:rerun-if-env-changed=LORA_JOIN_EUI");
    println!("cargo:rerun-if-env-changed=LORA_APP_KEY");
}
