fn main() {
    println!("cargo:rerun-if-env-changed=S826_LIB_DIR");

    // Only the real board backend needs the vendor library on the link line.
    if std::env::var_os("CARGO_FEATURE_S826").is_none() {
        return;
    }

    match std::env::var("S826_LIB_DIR") {
        Ok(dir) => println!("cargo:rustc-link-search=native={dir}"),
        Err(_) => println!(
            "cargo:warning=S826_LIB_DIR not set; relying on the system linker path for lib826_64"
        ),
    }
}
