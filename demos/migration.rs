use keypath_config::{item, ConfigRegistry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let config_path = temp_dir.path().join("app.toml");

    // A config file written by an older release, still using the old key
    // names.
    std::fs::write(
        &config_path,
        "[sound]\nvol = 0.5\n\n[net]\ntimeout_secs = 45\n",
    )?;
    println!("--- before ---");
    println!("{}", std::fs::read_to_string(&config_path)?);

    // Current items name the old keys as deprecated, oldest first.
    let volume = item("sound.volume", 1.0_f64).deprecated_keys(["sound.vol"]);
    let timeout = item("net.timeout", 30_i64).deprecated_keys(["net.timeout_secs"]);

    let mut registry = ConfigRegistry::builder()
        .register(volume.clone())
        .register(timeout.clone())
        .open(&config_path)?;

    // initialize() moves each surviving deprecated key onto its canonical
    // path, removes it, and saves because something changed.
    let affected = registry.initialize()?;
    println!("migration changed the document: {affected}");
    println!("sound.volume = {}", volume.get(&registry)?);
    println!("net.timeout  = {}", timeout.get(&registry)?);

    println!("--- after ---");
    println!("{}", std::fs::read_to_string(&config_path)?);
    Ok(())
}
