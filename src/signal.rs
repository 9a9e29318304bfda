//! Ctrl-C as a cooperative stop flag.
//!
//! The handler only flips an atomic; the scheduler checks it between ticks and
//! the git gateway checks it before starting and after finishing each command.
//!
//! Only unix installs a handler. Elsewhere Ctrl-C keeps its default behavior and
//! ends the process at once, without the "stopped" line.

use std::sync::atomic::AtomicBool;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn flag() -> &'static AtomicBool { &INTERRUPTED }

#[cfg(unix)]
extern "C" fn on_sigint(_: libc::c_int) {
    INTERRUPTED.store(true, std::sync::atomic::Ordering::SeqCst);
}

#[cfg(unix)]
pub fn install() -> std::io::Result<()> {
    let handler = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // Storing to an atomic is async-signal-safe.
    let prev = unsafe { libc::signal(libc::SIGINT, handler) };
    if prev == libc::SIG_ERR { return Err(std::io::Error::last_os_error()); }
    Ok(())
}

/// No handler on this platform; see the module docs.
#[cfg(not(unix))]
pub fn install() -> std::io::Result<()> { Ok(()) }
