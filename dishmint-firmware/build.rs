//! Build script for dishmint-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml and embeds it as postcard binary data

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use dishmint_core::config::DeviceConfig;

fn main() {
    setup_linker();
    embed_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse, validate and serialise device.toml
fn embed_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");
    if !config_path.exists() {
        fail(
            "device.toml not found!",
            &[
                "The firmware requires a device.toml configuration file",
                "in the dishmint-firmware directory.",
            ],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read device.toml", &[&e.to_string()]),
    };

    let config: DeviceConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            let msg = e.to_string();
            let lines: Vec<&str> = msg.lines().collect();
            fail("Invalid TOML in device.toml", &lines)
        }
    };

    if let Err(e) = config.validate() {
        fail("Invalid device configuration", &[&e.to_string()]);
    }

    let blob = match postcard::to_stdvec(&config) {
        Ok(blob) => blob,
        Err(e) => fail("Failed to encode configuration", &[&e.to_string()]),
    };

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("device.postcard"), blob).unwrap();

    println!(
        "cargo:warning=device.toml validated: {} player(s)",
        config.players.len()
    );
}

/// Abort the build with a boxed message
fn fail(title: &str, details: &[&str]) -> ! {
    let body = details
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
