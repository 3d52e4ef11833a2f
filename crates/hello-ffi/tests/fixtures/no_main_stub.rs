//! A `hello` library build that forgot to export `main`.

use std::os::raw::c_int;

#[no_mangle]
pub extern "C" fn hello_version() -> c_int {
    1
}
