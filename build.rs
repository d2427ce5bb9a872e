fn main() {
    // Point the linker at libtorch; defaults to a ./libtorch checkout.
    let libtorch = std::env::var("LIBTORCH").unwrap_or_else(|_| "libtorch".to_string());

    println!("cargo:rustc-link-search=native={}/lib", libtorch);
    println!("cargo:rustc-link-lib=dylib=torch");
    println!("cargo:rustc-link-lib=dylib=c10");

    println!("cargo:include={}/include", libtorch);
    println!("cargo:include={}/include/torch/csrc/api/include", libtorch);
    println!("cargo:rerun-if-env-changed=LIBTORCH");
}
