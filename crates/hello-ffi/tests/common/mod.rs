//! Shared helpers for native library tests
//!
//! Stub libraries are compiled from `tests/fixtures/*.rs` with `rustc` into
//! a temporary directory, under the platform file name for `hello`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Environment variable the stub's `main` reads its sink path from
pub const SINK_ENV: &str = "HELLO_STUB_SINK";

/// A compiled stub library living in its own temporary directory
pub struct StubLibrary {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl StubLibrary {
    pub fn dir_path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn sink_path(&self) -> PathBuf {
        self.dir.path().join("sink.txt")
    }

    /// Contents written by the stub so far (empty if it never ran)
    pub fn sink_contents(&self) -> Vec<u8> {
        std::fs::read(self.sink_path()).unwrap_or_default()
    }
}

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Compile `fixture` into a cdylib named `hello`
pub fn build_stub(fixture: &str) -> StubLibrary {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(libloading::library_filename("hello"));

    let rustc = std::env::var_os("RUSTC").unwrap_or_else(|| "rustc".into());
    let output = Command::new(rustc)
        .arg("--edition=2021")
        .arg("--crate-type=cdylib")
        .arg("--crate-name=hello")
        .arg("-o")
        .arg(&path)
        .arg(fixture_path(fixture))
        .output()
        .expect("failed to run rustc");

    assert!(
        output.status.success(),
        "compiling {} failed:\n{}",
        fixture,
        String::from_utf8_lossy(&output.stderr)
    );

    StubLibrary { dir, path }
}

pub fn hello_stub() -> StubLibrary {
    build_stub("hello_stub.rs")
}

pub fn no_main_stub() -> StubLibrary {
    build_stub("no_main_stub.rs")
}
