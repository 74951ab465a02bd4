//! Glue for handling `android.app.Application` lifecycle callbacks in Rust
//!
//! An Android process has a single `Application` object that outlives every
//! `Activity`. This crate implements the native half of an `Application`
//! subclass: the Java class only declares `native` methods and stores one
//! opaque `long`, while the forwarding logic lives in Rust.
//!
//! ```java
//! public class RustApplication extends android.app.Application {
//!     private long mApplication;
//!
//!     @Override public void onCreate() { mApplication = nativeOnCreate(); }
//!     @Override public void onConfigurationChanged(Configuration config) {
//!         nativeOnConfigurationChanged(mApplication, config);
//!     }
//!     @Override public void onLowMemory() { nativeOnLowMemory(mApplication); }
//!     @Override public void onTerminate() {
//!         nativeOnTerminate(mApplication);
//!         mApplication = 0;
//!     }
//!     public void setNative(long handle) { nativeSetNative(mApplication, handle); }
//!     public static boolean isEmulator() { return nativeIsEmulator(); }
//!
//!     private native long nativeOnCreate();
//!     private native void nativeOnConfigurationChanged(long app, Configuration config);
//!     private native void nativeOnLowMemory(long app);
//!     private native void nativeOnTerminate(long app);
//!     private native void nativeSetNative(long app, long handle);
//!     private static native boolean nativeIsEmulator();
//! }
//! ```
//!
//! The natives are registered from the application's `JNI_OnLoad` with
//! `register_natives()`.
//!
//! The call through to the `android.app.Application` base implementation is
//! made from Rust, via a non-virtual `CallNonvirtualVoidMethodA` call, so the
//! Java overrides must *not* call `super.onX()` themselves. An exception
//! thrown by the base class is left pending and nothing is forwarded.
//!
//! The application crate provides the
//! [`NativeApplication`] that events are forwarded to by defining:
//!
//! ```ignore
//! #[no_mangle]
//! fn android_application_create() -> Box<dyn android_application::NativeApplication> {
//!     Box::new(MyNativeSide::default())
//! }
//! ```
//!
//! # Native handles
//!
//! Events are forwarded along with the [`NativeHandle`] most recently passed
//! to `setNative()`. Until something binds a non-zero handle, events are not
//! forwarded at all (see [`Delivery::Unbound`]).
//!
//! # Logging
//!
//! This crate logs via the [`log`] facade. Applications should install a
//! logger, such as `android_logger`, to see the output in `logcat`.

mod application;
pub use application::{
    Application, ApplicationContext, Delivery, HostApplication, LifecycleState, NativeApplication,
};

mod config;
pub use config::{
    ConfigChanges, Configuration, ConfigurationRef, Keyboard, KeysHidden, LayoutDir, Navigation,
    Orientation, ScreenLong, ScreenRound, ScreenSize, Touchscreen, UiModeNight, UiModeType,
};

mod device;
pub use device::{is_emulator, BuildInfo};

mod error;
pub use error::{AppError, Result};

mod handle;
pub use handle::{BoundHandle, NativeHandle};

mod jni_utils;
mod util;

#[cfg(target_os = "android")]
mod bridge;
#[cfg(target_os = "android")]
pub use bridge::register_natives;
