//! The JNI calls made by the lifecycle bridge run inside Java native method
//! implementations, so a pending exception will be rethrown once we return to
//! Java. Calls through to `android.app.Application` leave exceptions pending
//! so that Java sees a base class failure. Calls that only gather information
//! (such as reading the `Configuration`) check + clear exceptions and map them
//! into Rust errors instead.

// Only reachable from the JNI entry points, which only exist on Android
#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use jni::{
    objects::{JObject, JString, JValue},
    sys::jvalue,
    JNIEnv,
};

use crate::{
    application::HostApplication,
    config::{Configuration, Keyboard, KeysHidden, Navigation, Orientation, Touchscreen},
    error::{AppError, InternalAppError, InternalResult, Result},
};

const APPLICATION_CLASS: &str = "android/app/Application";

/// An `android.app.Application` lifecycle method, called non-virtually
struct BaseMethod {
    name: &'static str,
    sig: &'static str,
}

const ON_CREATE: BaseMethod = BaseMethod {
    name: "onCreate",
    sig: "()V",
};
const ON_CONFIGURATION_CHANGED: BaseMethod = BaseMethod {
    name: "onConfigurationChanged",
    sig: "(Landroid/content/res/Configuration;)V",
};
const ON_LOW_MEMORY: BaseMethod = BaseMethod {
    name: "onLowMemory",
    sig: "()V",
};
const ON_TERMINATE: BaseMethod = BaseMethod {
    name: "onTerminate",
    sig: "()V",
};

/// Use with `.map_err()` to map `jni::errors::Error::JavaException` into a
/// richer error based on the actual contents of the `JThrowable`
///
/// This will also clear the exception
pub(crate) fn clear_and_map_exception_to_err(
    env: &mut JNIEnv<'_>,
    err: jni::errors::Error,
) -> InternalAppError {
    if matches!(err, jni::errors::Error::JavaException) {
        let result = env.with_local_frame::<_, _, InternalAppError>(5, |env| {
            let e = env.exception_occurred()?;
            assert!(!e.is_null()); // should only be called after receiving a JavaException Result
            env.exception_clear()?;

            // Unlike getMessage(), toString() is never null and includes the
            // exception class
            let msg = env
                .call_method(&e, "toString", "()Ljava/lang/String;", &[])?
                .l()?;
            let msg: String = env.get_string(&JString::from(msg))?.into();
            Ok(msg)
        });

        match result {
            Ok(msg) => InternalAppError::JniException(msg),
            Err(err) => InternalAppError::JniException(format!(
                "UNKNOWN (Failed to query JThrowable: {err:?})"
            )),
        }
    } else {
        err.into()
    }
}

/// Calls through to the `android.app.Application` implementation of each
/// lifecycle method, regardless of any Java overrides
pub(crate) struct JniHost<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    this: &'a JObject<'local>,
    new_config: Option<&'a JObject<'local>>,
}

impl<'a, 'local> JniHost<'a, 'local> {
    pub fn new(env: &'a mut JNIEnv<'local>, this: &'a JObject<'local>) -> Self {
        Self {
            env,
            this,
            new_config: None,
        }
    }

    /// The `android.content.res.Configuration` to pass to the base
    /// `onConfigurationChanged()`
    pub fn with_config(mut self, config: &'a JObject<'local>) -> Self {
        self.new_config = Some(config);
        self
    }

    /// Makes a non-virtual call to the `android.app.Application` method
    ///
    /// jni-rs has no wrapper for `CallNonvirtual<Type>MethodA` and a virtual
    /// call would dispatch straight back into the Java override. Any exception
    /// thrown by the base class is left pending.
    fn call_base(&mut self, method: &BaseMethod, args: &[JValue]) -> Result<()> {
        let this = self.this;
        self.env
            .with_local_frame::<_, _, InternalAppError>(2, |env| {
                let class = env.find_class(APPLICATION_CLASS)?;
                let method_id = env.get_method_id(&class, method.name, method.sig)?;
                let args: Vec<jvalue> = args.iter().map(|arg| arg.as_jni()).collect();

                let raw_env = env.get_raw();
                unsafe {
                    let call = (**raw_env).CallNonvirtualVoidMethodA.ok_or(
                        jni::errors::Error::JNIEnvMethodNotFound("CallNonvirtualVoidMethodA"),
                    )?;
                    call(
                        raw_env,
                        this.as_raw(),
                        class.as_raw(),
                        method_id.into_raw(),
                        args.as_ptr(),
                    );
                }

                if env.exception_check()? {
                    return Err(jni::errors::Error::JavaException.into());
                }
                Ok(())
            })
            .map_err(AppError::from)
    }
}

impl<'a, 'local> HostApplication for JniHost<'a, 'local> {
    fn base_on_create(&mut self) -> Result<()> {
        self.call_base(&ON_CREATE, &[])
    }

    fn base_on_configuration_changed(&mut self) -> Result<()> {
        let null = JObject::null();
        let config = self.new_config.unwrap_or(&null);
        self.call_base(&ON_CONFIGURATION_CHANGED, &[JValue::Object(config)])
    }

    fn base_on_low_memory(&mut self) -> Result<()> {
        self.call_base(&ON_LOW_MEMORY, &[])
    }

    fn base_on_terminate(&mut self) -> Result<()> {
        self.call_base(&ON_TERMINATE, &[])
    }
}

fn int_field(env: &mut JNIEnv<'_>, obj: &JObject<'_>, name: &str) -> InternalResult<i32> {
    Ok(env.get_field(obj, name, "I")?.i()?)
}

/// Android reports undefined dimensions as `0`
fn defined(value: i32) -> Option<i32> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}

fn non_empty_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> InternalResult<Option<String>> {
    if obj.is_null() {
        return Ok(None);
    }
    let value: String = env.get_string(&JString::from(obj))?.into();
    Ok(if value.is_empty() { None } else { Some(value) })
}

fn read_configuration(env: &mut JNIEnv<'_>, config: &JObject<'_>) -> InternalResult<Configuration> {
    let mut out = Configuration {
        font_scale: env.get_field(config, "fontScale", "F")?.f()?,
        mcc: int_field(env, config, "mcc")?,
        mnc: int_field(env, config, "mnc")?,
        orientation: Orientation::from(int_field(env, config, "orientation")?),
        touchscreen: Touchscreen::from(int_field(env, config, "touchscreen")?),
        keyboard: Keyboard::from(int_field(env, config, "keyboard")?),
        keys_hidden: KeysHidden::from(int_field(env, config, "keyboardHidden")?),
        navigation: Navigation::from(int_field(env, config, "navigation")?),
        screen_width_dp: defined(int_field(env, config, "screenWidthDp")?),
        screen_height_dp: defined(int_field(env, config, "screenHeightDp")?),
        smallest_screen_width_dp: defined(int_field(env, config, "smallestScreenWidthDp")?),
        density_dpi: defined(int_field(env, config, "densityDpi")?)
            .and_then(|dpi| u32::try_from(dpi).ok()),
        ..Default::default()
    };
    out.set_ui_mode(int_field(env, config, "uiMode")?);
    out.set_screen_layout(int_field(env, config, "screenLayout")?);

    // The `locale` field is deprecated in favour of `getLocales()` but still
    // tracks the primary locale on all API levels
    let locale = env
        .get_field(config, "locale", "Ljava/util/Locale;")?
        .l()?;
    if !locale.is_null() {
        let language = env
            .call_method(&locale, "getLanguage", "()Ljava/lang/String;", &[])?
            .l()?;
        out.language = non_empty_string(env, language)?;
        let country = env
            .call_method(&locale, "getCountry", "()Ljava/lang/String;", &[])?
            .l()?;
        out.country = non_empty_string(env, country)?;
    }

    Ok(out)
}

/// Snapshots an `android.content.res.Configuration` object
pub(crate) fn configuration_from_java(
    env: &mut JNIEnv<'_>,
    config: &JObject<'_>,
) -> InternalResult<Configuration> {
    // We may read a handful of strings + locale objects; don't leak them into
    // the caller's frame
    let result = env.with_local_frame::<_, _, InternalAppError>(8, |env| {
        read_configuration(env, config)
    });
    result.map_err(|err| match err {
        InternalAppError::JvmError(err) => clear_and_map_exception_to_err(env, err),
        err => err,
    })
}

/// Snapshots `this.getResources().getConfiguration()`
pub(crate) fn application_configuration(
    env: &mut JNIEnv<'_>,
    this: &JObject<'_>,
) -> InternalResult<Configuration> {
    let result = env.with_local_frame::<_, _, InternalAppError>(4, |env| {
        let resources = env
            .call_method(this, "getResources", "()Landroid/content/res/Resources;", &[])?
            .l()?;
        let config = env
            .call_method(
                &resources,
                "getConfiguration",
                "()Landroid/content/res/Configuration;",
                &[],
            )?
            .l()?;
        read_configuration(env, &config)
    });
    result.map_err(|err| match err {
        InternalAppError::JvmError(err) => clear_and_map_exception_to_err(env, err),
        err => err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_methods_return_void() {
        use jni::signature::{Primitive, ReturnType, TypeSignature};

        // Base calls go through CallNonvirtualVoidMethodA
        for (method, arg_count) in [
            (ON_CREATE, 0),
            (ON_CONFIGURATION_CHANGED, 1),
            (ON_LOW_MEMORY, 0),
            (ON_TERMINATE, 0),
        ] {
            let sig = TypeSignature::from_str(method.sig).unwrap();
            assert_eq!(sig.ret, ReturnType::Primitive(Primitive::Void), "{}", method.name);
            assert_eq!(sig.args.len(), arg_count, "{}", method.name);
        }
    }

    #[test]
    fn zero_dimensions_are_undefined() {
        assert_eq!(defined(0), None);
        assert_eq!(defined(411), Some(411));
    }
}
