//! The `native` methods of the Java `Application` subclass
//!
//! The Java side owns a `long` that points at a heap allocated [`Application`];
//! it is created by `nativeOnCreate()` and freed by `nativeOnTerminate()`.
//! There is no process-wide static referring to the application.

use std::ffi::c_void;
use std::sync::Arc;

use jni::{
    objects::{JClass, JObject},
    sys::{jboolean, jlong, JNI_FALSE, JNI_TRUE},
    JNIEnv, NativeMethod,
};
use log::{error, warn};

use crate::{
    error::{AppError, Result},
    jni_utils::{self, JniHost},
    util::abort_on_panic,
    Application, BuildInfo, Configuration, NativeApplication,
};

extern "Rust" {
    /// Provided by the application crate, e.g.
    ///
    /// ```ignore
    /// #[no_mangle]
    /// fn android_application_create() -> Box<dyn NativeApplication> {
    ///     Box::new(MyNativeSide::default())
    /// }
    /// ```
    fn android_application_create() -> Box<dyn NativeApplication>;
}

struct NativeApp {
    app: Application,
    #[cfg(feature = "publish-context")]
    _application_ref: jni::objects::GlobalRef,
}

/// Registers the lifecycle `native` methods on the given `Application`
/// subclass (e.g. `"com/example/RustApplication"`)
///
/// This is expected to be called from the application's `JNI_OnLoad`, before
/// Android creates the `Application` object.
pub fn register_natives(env: &mut JNIEnv<'_>, class_name: &str) -> Result<()> {
    let methods = [
        NativeMethod {
            name: "nativeOnCreate".into(),
            sig: "()J".into(),
            fn_ptr: native_on_create as *mut c_void,
        },
        NativeMethod {
            name: "nativeOnConfigurationChanged".into(),
            sig: "(JLandroid/content/res/Configuration;)V".into(),
            fn_ptr: native_on_configuration_changed as *mut c_void,
        },
        NativeMethod {
            name: "nativeOnLowMemory".into(),
            sig: "(J)V".into(),
            fn_ptr: native_on_low_memory as *mut c_void,
        },
        NativeMethod {
            name: "nativeOnTerminate".into(),
            sig: "(J)V".into(),
            fn_ptr: native_on_terminate as *mut c_void,
        },
        NativeMethod {
            name: "nativeSetNative".into(),
            sig: "(JJ)V".into(),
            fn_ptr: native_set_native as *mut c_void,
        },
        NativeMethod {
            name: "nativeIsEmulator".into(),
            sig: "()Z".into(),
            fn_ptr: native_is_emulator as *mut c_void,
        },
    ];

    env.register_native_methods(class_name, &methods)
        .map_err(|err| AppError::from(jni_utils::clear_and_map_exception_to_err(env, err)))
}

/// Looks up the application behind the pointer held by the Java object
///
/// # Safety
///
/// `ptr` must be `0` or a pointer returned by `nativeOnCreate()` that has not
/// been passed to `nativeOnTerminate()`
///
/// `setNative()` may run on any thread, concurrently with the main thread
/// callbacks, so only shared references are ever handed out.
unsafe fn with_native_app(ptr: jlong, event: &str, f: impl FnOnce(&NativeApp)) {
    if ptr == 0 {
        warn!("Ignoring {event}: application was never created");
        return;
    }
    f(&*(ptr as *const NativeApp));
}

#[cfg(feature = "publish-context")]
fn publish_android_context(env: &mut JNIEnv<'_>, this: &JObject<'_>) -> Option<jni::objects::GlobalRef> {
    let publish = |env: &mut JNIEnv<'_>| -> jni::errors::Result<jni::objects::GlobalRef> {
        let vm = env.get_java_vm()?;
        let application = env.new_global_ref(this)?;
        unsafe {
            ndk_context::initialize_android_context(
                vm.get_java_vm_pointer().cast(),
                application.as_obj().as_raw().cast(),
            );
        }
        Ok(application)
    };
    publish(env)
        .map_err(|err| error!("Failed to publish Android context: {err}"))
        .ok()
}

extern "system" fn native_on_create<'local>(mut env: JNIEnv<'local>, this: JObject<'local>) -> jlong {
    abort_on_panic(|| {
        let native: Arc<dyn NativeApplication> = Arc::from(unsafe { android_application_create() });
        let app = Application::new(native);

        let config = jni_utils::application_configuration(&mut env, &this).unwrap_or_else(|err| {
            error!("Failed to read application configuration: {err}");
            Configuration::default()
        });
        let build = BuildInfo::from_system_properties();

        #[cfg(feature = "publish-context")]
        let application_ref = match publish_android_context(&mut env, &this) {
            Some(application_ref) => application_ref,
            None => return 0,
        };

        let mut host = JniHost::new(&mut env, &this);
        if let Err(err) = app.on_create(&mut host, config, build) {
            // Any exception thrown by the base class is still pending and will
            // be rethrown when we return to Java
            error!("onCreate failed: {err}");
            #[cfg(feature = "publish-context")]
            unsafe {
                ndk_context::release_android_context();
            }
            return 0;
        }

        let native_app = Box::new(NativeApp {
            app,
            #[cfg(feature = "publish-context")]
            _application_ref: application_ref,
        });
        Box::into_raw(native_app) as jlong
    })
}

extern "system" fn native_on_configuration_changed<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    ptr: jlong,
    new_config: JObject<'local>,
) {
    abort_on_panic(|| unsafe {
        with_native_app(ptr, "onConfigurationChanged", |native| {
            let config = jni_utils::configuration_from_java(&mut env, &new_config)
                .unwrap_or_else(|err| {
                    error!("Failed to read new configuration: {err}");
                    native.app.context().config().copy()
                });

            let mut host = JniHost::new(&mut env, &this).with_config(&new_config);
            if let Err(err) = native.app.on_configuration_changed(&mut host, config) {
                error!("onConfigurationChanged failed: {err}");
            }
        })
    })
}

extern "system" fn native_on_low_memory<'local>(mut env: JNIEnv<'local>, this: JObject<'local>, ptr: jlong) {
    abort_on_panic(|| unsafe {
        with_native_app(ptr, "onLowMemory", |native| {
            let mut host = JniHost::new(&mut env, &this);
            if let Err(err) = native.app.on_low_memory(&mut host) {
                error!("onLowMemory failed: {err}");
            }
        })
    })
}

extern "system" fn native_on_terminate<'local>(mut env: JNIEnv<'local>, this: JObject<'local>, ptr: jlong) {
    abort_on_panic(|| {
        if ptr == 0 {
            warn!("Ignoring onTerminate: application was never created");
            return;
        }
        let native = unsafe { Box::from_raw(ptr as *mut NativeApp) };

        let mut host = JniHost::new(&mut env, &this);
        if let Err(err) = native.app.on_terminate(&mut host) {
            error!("onTerminate failed: {err}");
            // Java still holds the pointer if the base class threw
            let _ = Box::into_raw(native);
            return;
        }

        #[cfg(feature = "publish-context")]
        unsafe {
            ndk_context::release_android_context();
        }
    })
}

extern "system" fn native_set_native<'local>(
    _env: JNIEnv<'local>,
    _this: JObject<'local>,
    ptr: jlong,
    handle: jlong,
) {
    abort_on_panic(|| unsafe {
        with_native_app(ptr, "setNative", |native| {
            native.app.set_native(handle);
        })
    })
}

extern "system" fn native_is_emulator<'local>(_env: JNIEnv<'local>, _class: JClass<'local>) -> jboolean {
    abort_on_panic(|| {
        match BuildInfo::from_system_properties() {
            Some(build) if build.is_emulator() => JNI_TRUE,
            Some(_) => JNI_FALSE,
            None => {
                warn!("ro.product.name is not set; assuming not an emulator");
                JNI_FALSE
            }
        }
    })
}
