//! Build script for compile-time configuration injection.
//!
//! Set environment variables before building to override the defaults:
//!
//!   WIEGAND_DEAD_TIME_US=200 \
//!   WIEGAND_SEND_INTERVAL_MS=10000 \
//!   WIEGAND_OVERFLOW_POLICY=reject \
//!   cargo build --release --features esp32
//!
//! Anything left unset keeps the value from `Config::default()`.

fn main() {
    // Re-run build script if these environment variables change
    println!("cargo::rerun-if-env-changed=WIEGAND_DEAD_TIME_US");
    println!("cargo::rerun-if-env-changed=WIEGAND_PARTIAL_TIMEOUT_MS");
    println!("cargo::rerun-if-env-changed=WIEGAND_COMPLETE_GAP_MS");
    println!("cargo::rerun-if-env-changed=WIEGAND_SEND_INTERVAL_MS");
    println!("cargo::rerun-if-env-changed=WIEGAND_DUPLICATE_WINDOW_MS");
    println!("cargo::rerun-if-env-changed=WIEGAND_QUEUE_CAPACITY");
    println!("cargo::rerun-if-env-changed=WIEGAND_OVERFLOW_POLICY");
    println!("cargo::rerun-if-env-changed=WIEGAND_POLL_INTERVAL_MS");
    println!("cargo::rerun-if-env-changed=WIEGAND_BAUD");
}
