// Adds a link search path for the native container shim when the `native`
// feature is enabled. The shim itself is built outside of cargo.

fn main() {
    println!("cargo:rerun-if-env-changed=LITEPAINT_NATIVE_DIR");
    if std::env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }
    if let Some(dir) = std::env::var_os("LITEPAINT_NATIVE_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }
}
