/// git-bash-switch build script.
///
/// The patcher drives the Win32 resource-update API, so the finished tool is
/// only useful on Windows. The core (string-table codec, toggle procedure)
/// is platform-neutral and unit-tests anywhere, so a non-Windows host gets a
/// warning rather than a hard failure.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        println!(
            "cargo:warning=git-bash-switch patches executables only on Windows; \
             the Win32 backend is compiled out (CARGO_CFG_TARGET_OS = {target_os:?})"
        );
    }

    // Only re-run the build script when it changes.
    println!("cargo:rerun-if-changed=build.rs");
}
