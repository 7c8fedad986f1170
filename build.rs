//! This build script copies the `memory.x` file from the crate root into a directory where
//! the linker can always find it at build time. It also records the build time, which
//! seeds the watch's wall clock.

use chrono::{Local, Offset};
use std::{env, fs::File, io::Write, path::PathBuf};

fn main() {
    // Put memory layout in the output directory and ensure it's on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Create rs file with current UTC time and the build machine's UTC offset
    let now = Local::now();
    File::create(out.join("utc.rs"))
        .unwrap()
        .write_fmt(format_args!(
            "const UTC_TIME: i64 = {:?};\nconst UTC_OFFSET: i32 = {:?};\n",
            now.timestamp(),
            now.offset().fix().local_minus_utc(),
        ))
        .unwrap();

    // No `rerun-if-changed` here: the script has to run on every build to keep
    // the recorded time current.
}
