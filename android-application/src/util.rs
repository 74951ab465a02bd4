// The JNI entry points that use these only exist on Android
#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Describes a caught panic payload, which is usually a `&str` or `String`
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "UNKNOWN"
    }
}

pub(crate) fn log_panic(panic: Box<dyn Any + Send>) {
    log::error!("RustPanic: {}", panic_message(&*panic));
}

/// Run a closure and abort the program if it panics.
///
/// This is generally used to ensure Rust callbacks won't unwind past the JNI
/// boundary, which leads to undefined behaviour.
pub(crate) fn abort_on_panic<R>(f: impl FnOnce() -> R) -> R {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|panic| {
        // Try logging the panic, but abort if that fails.
        let _ = catch_unwind(AssertUnwindSafe(move || log_panic(panic)));

        std::process::abort();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_messages() {
        let payload = catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(&*payload), "static");

        let payload = catch_unwind(|| panic!("formatted {}", 42)).unwrap_err();
        assert_eq!(panic_message(&*payload), "formatted 42");

        let payload = catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(&*payload), "UNKNOWN");
    }

    #[test]
    fn abort_on_panic_returns_value() {
        assert_eq!(abort_on_panic(|| 3), 3);
    }
}
