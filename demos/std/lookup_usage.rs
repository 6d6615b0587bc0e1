//! Named module identifiers and GM5 addresses.
//!
//! ```bash
//! cargo run --example lookup_usage
//! ```

use ibus_link::protocol::lookups::{Gm5Address, Gm5StateGroup, ModuleId};

fn main() {
    println!("=== Module identifiers ===\n");
    for raw in [0x00u8, 0x50, 0x68, 0x80, 0xBF, 0x18] {
        match ModuleId::try_from(raw) {
            Ok(module) => println!("  {:02X} -> {} ({:?})", raw, module.mnemonic(), module),
            Err(invalid) => println!("  {:02X} -> unknown ({:?})", raw, invalid),
        }
    }

    println!("\n=== GM5 ===\n");
    // Request the digital IO states of the body module.
    let request = [u8::from(Gm5StateGroup::Digital)];
    println!(
        "  DIA -> GM5 payload {:02X?}, dome light address {:02X}",
        request,
        u8::from(Gm5Address::DomeLightButton)
    );
}
