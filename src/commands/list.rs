//! List command implementation

use crate::buses;

/// List all compiled-in bus backends
pub fn list_buses() {
    print!("{}", buses::bus_help());
    println!();
    println!("Select one with -p/--bus, e.g. -p dummy:size=16k or -p linux_i2c:bus=1");
}
