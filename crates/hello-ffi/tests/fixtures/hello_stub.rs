//! Stand-in for the native `hello` library.
//!
//! `main` appends the bytes it receives, plus a newline, to the file named by
//! `HELLO_STUB_SINK`. Without the variable it does nothing.

use std::ffi::CStr;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::raw::c_char;

#[no_mangle]
pub extern "C" fn main(name: *const c_char) {
    if name.is_null() {
        return;
    }
    let Some(sink) = std::env::var_os("HELLO_STUB_SINK") else {
        return;
    };

    let bytes = unsafe { CStr::from_ptr(name) }.to_bytes();
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(sink) {
        let _ = file.write_all(bytes);
        let _ = file.write_all(b"\n");
    }
}
