use keypath_config::{item, ConfigRegistry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let config_path = temp_dir.path().join("app.toml");

    // Declare the configuration surface. Items are immutable descriptors;
    // keep a copy for reads and register a clone with the registry.
    let app_name = item("app.name", String::from("MyApp"));
    let port = item("server.port", 8080_i64);
    let debug = item("app.debug", false);
    let volume = item("sound.volume", 1.0_f64);

    let mut registry = ConfigRegistry::builder()
        .register(app_name.clone())
        .register(port.clone())
        .register(debug.clone())
        .register(volume.clone())
        .open(&config_path)?;

    // First run: seeds every default and writes the file.
    registry.initialize()?;
    println!(
        "{} listening on port {}",
        app_name.get(&registry)?,
        port.get(&registry)?
    );

    // A saving write returns the previous value and flushes everything.
    let previous = port.set(&mut registry, 9000)?;
    println!("port: {previous} -> {}", port.get(&registry)?);

    // A write with save = false stays in memory...
    debug.set_with(&mut registry, true, false)?;
    // ...until any saving write flushes the whole document, this one included.
    volume.set(&mut registry, 0.5)?;

    println!("--- {} ---", config_path.display());
    println!("{}", std::fs::read_to_string(&config_path)?);
    Ok(())
}
