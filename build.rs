use std::env;
use std::fs;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    copy_configs()?;
    Ok(())
}

/// Copy config files next to the built artifacts so the loader finds
/// them relative to the executable.
fn copy_configs() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = env::var("OUT_DIR")?;
    let profile = env::var("PROFILE")?;

    // Get the target directory (OUT_DIR is deep in build artifacts)
    // OUT_DIR is like: target/debug/build/input-pool-xxx/out
    // We want: target/debug/config
    let target_dir = Path::new(&out_dir)
        .parent()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .ok_or("Could not determine target directory")?;

    let config_out_dir = target_dir.join("config");
    fs::create_dir_all(&config_out_dir)?;

    // For release builds, only copy release.toml
    // For debug builds, copy both debug.toml and release.toml
    if profile == "release" {
        let release_config = Path::new("config/release.toml");
        if release_config.exists() {
            fs::copy(release_config, config_out_dir.join("release.toml"))?;
            println!("cargo:rerun-if-changed=config/release.toml");
        }
    } else {
        let debug_config = Path::new("config/debug.toml");
        if debug_config.exists() {
            fs::copy(debug_config, config_out_dir.join("debug.toml"))?;
            println!("cargo:rerun-if-changed=config/debug.toml");
        }

        let release_config = Path::new("config/release.toml");
        if release_config.exists() {
            fs::copy(release_config, config_out_dir.join("release.toml"))?;
            println!("cargo:rerun-if-changed=config/release.toml");
        }
    }

    Ok(())
}
