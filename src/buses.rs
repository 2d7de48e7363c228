//! Bus backend registration and dispatch
//!
//! Backends are selected with a string of the form `name[:key=value,...]`.
//! Which backends exist depends on the features the binary was built with.

use st25dv_core::bus::{BusInfo, I2cBus};

/// A boxed bus usable by the driver
pub type BoxedBus = Box<dyn I2cBus + Send>;

/// Errors from selecting or opening a bus backend
#[derive(Debug, thiserror::Error)]
pub enum BusOpenError {
    /// No backend by that name was compiled in
    #[error("Unknown bus '{name}'. Available buses: {available}")]
    Unknown { name: String, available: String },

    /// Options did not parse for the chosen backend
    #[error("Invalid {bus} options: {message}")]
    InvalidOptions { bus: &'static str, message: String },

    /// The backend failed to open
    #[error("Failed to open {bus}: {message}")]
    OpenFailed { bus: &'static str, message: String },
}

/// Get information about all buses enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_buses() -> Vec<BusInfo> {
    let mut buses = Vec::new();

    #[cfg(feature = "dummy")]
    buses.push(BusInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "In-memory tag emulator (size=4k|16k|64k,password=<hex>,uid=<hex>)",
        requires_root: false,
    });

    #[cfg(feature = "linux-i2c")]
    buses.push(BusInfo {
        name: "linux_i2c",
        aliases: &["linux-i2c", "i2c-dev"],
        description: "Linux i2c-dev interface (dev=/dev/i2c-N or bus=N)",
        requires_root: false,
    });

    buses
}

/// Generate help text listing all available buses
pub fn bus_help() -> String {
    let buses = available_buses();

    if buses.is_empty() {
        return "No buses available (recompile with bus features enabled)".to_string();
    }

    let mut help = String::from("Available buses:\n");
    for b in &buses {
        let root = if b.requires_root { " [root]" } else { "" };
        help.push_str(&format!("  {:10} - {}{}\n", b.name, b.description, root));
        if !b.aliases.is_empty() {
            help.push_str(&format!("  {:10}   aliases: {}\n", "", b.aliases.join(", ")));
        }
    }

    help
}

/// Comma-separated list of bus names
pub fn bus_names_short() -> String {
    let names: Vec<&str> = available_buses().iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Resolve a bus name or alias to its canonical name
pub fn find_bus(name: &str) -> Option<&'static str> {
    available_buses()
        .into_iter()
        .find(|b| b.name == name || b.aliases.iter().any(|a| *a == name))
        .map(|b| b.name)
}

/// Parse a bus string into a name and `key=value` options
///
/// `dummy:size=16k,password=0x10` yields `("dummy", [("size", "16k"),
/// ("password", "0x10")])`. Options without `=` get an empty value.
pub fn parse_bus_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    let Some((name, rest)) = s.split_once(':') else {
        return (s, Vec::new());
    };

    let options = rest
        .split(',')
        .filter(|opt| !opt.is_empty())
        .map(|opt| opt.split_once('=').unwrap_or((opt, "")))
        .collect();

    (name, options)
}

/// Open the bus described by `bus_str`
#[allow(unused_variables)]
pub fn open_bus(bus_str: &str) -> Result<BoxedBus, BusOpenError> {
    let (name, options) = parse_bus_string(bus_str);

    let canonical = find_bus(name).ok_or_else(|| BusOpenError::Unknown {
        name: name.to_string(),
        available: bus_names_short(),
    })?;

    match canonical {
        #[cfg(feature = "dummy")]
        "dummy" => {
            let config = st25dv_dummy::parse_options(&options).map_err(|message| {
                BusOpenError::InvalidOptions {
                    bus: "dummy",
                    message,
                }
            })?;
            log::info!("Using emulated {} tag", config.capacity);
            Ok(Box::new(st25dv_dummy::DummyTag::new(config)))
        }
        #[cfg(feature = "linux-i2c")]
        "linux_i2c" => {
            use st25dv_linux_i2c::{parse_options, LinuxI2c};

            let config = parse_options(&options).map_err(|message| {
                BusOpenError::InvalidOptions {
                    bus: "linux_i2c",
                    message,
                }
            })?;
            log::info!("Opening Linux I2C adapter {}...", config.device);
            let bus = LinuxI2c::open(&config).map_err(|e| BusOpenError::OpenFailed {
                bus: "linux_i2c",
                message: format!(
                    "{}\nMake sure the i2c-dev module is loaded and you have read/write \
                     permissions.\nYou may need to: sudo usermod -aG i2c $USER",
                    e
                ),
            })?;
            Ok(Box::new(bus))
        }
        _ => Err(BusOpenError::Unknown {
            name: name.to_string(),
            available: bus_names_short(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bus_string_plain() {
        let (name, options) = parse_bus_string("dummy");
        assert_eq!(name, "dummy");
        assert!(options.is_empty());
    }

    #[test]
    fn test_parse_bus_string_options() {
        let (name, options) = parse_bus_string("linux_i2c:dev=/dev/i2c-1,verbose");
        assert_eq!(name, "linux_i2c");
        assert_eq!(options, vec![("dev", "/dev/i2c-1"), ("verbose", "")]);
    }

    #[test]
    fn test_unknown_bus() {
        assert!(find_bus("ch341a").is_none());
        assert!(matches!(
            open_bus("ch341a"),
            Err(BusOpenError::Unknown { .. })
        ));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy() {
        assert_eq!(find_bus("emulator"), Some("dummy"));
        assert!(open_bus("dummy:size=64k").is_ok());
        assert!(matches!(
            open_bus("dummy:size=2k"),
            Err(BusOpenError::InvalidOptions { bus: "dummy", .. })
        ));
    }

    #[cfg(feature = "linux-i2c")]
    #[test]
    fn test_linux_i2c_requires_device() {
        assert_eq!(find_bus("i2c-dev"), Some("linux_i2c"));
        assert!(matches!(
            open_bus("linux_i2c"),
            Err(BusOpenError::InvalidOptions { .. })
        ));
    }
}
