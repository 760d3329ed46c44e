use std::env;

fn main() {
    // The firmware links against the cortex-m-rt linker script, which pulls in
    // the memory.x that embassy-stm32 generates for the selected chip. Host
    // builds (simulation and tests) use the normal host linker setup.
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    if target_arch == "arm" {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
}
