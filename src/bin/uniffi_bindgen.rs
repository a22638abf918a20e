//! Generates Swift and Kotlin bindings for the crafting calculator library.
//!
//! ```bash
//! cargo build --release
//! cargo run --features cli --bin uniffi-bindgen generate \
//!     --library target/release/libcrafting_calculator.so --language swift --out-dir ./bindings
//! ```
//!
//! Use `--language kotlin` for Android.

fn main() {
    uniffi::uniffi_bindgen_main()
}
