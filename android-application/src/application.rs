use std::fmt;
use std::hash::Hash;
use std::mem;
use std::sync::{Arc, RwLock};

use log::{debug, warn};

use crate::config::{ConfigChanges, Configuration, ConfigurationRef};
use crate::device::BuildInfo;
use crate::error::Result;
use crate::handle::{BoundHandle, NativeHandle};

/// The base `android.app.Application` implementation
///
/// Every lifecycle override must call through to the base class; the
/// forwarder does this via these methods before (or, for creation, after
/// publishing the context) notifying the native side.
pub trait HostApplication {
    fn base_on_create(&mut self) -> Result<()>;
    fn base_on_configuration_changed(&mut self) -> Result<()>;
    fn base_on_low_memory(&mut self) -> Result<()>;
    fn base_on_terminate(&mut self) -> Result<()>;
}

/// The native counterpart that lifecycle events are forwarded to
///
/// Events are only forwarded while a handle is bound (see
/// [`ApplicationContext::set_native()`]) and the handle is passed back so an
/// implementation can locate the object it refers to.
///
/// Callbacks are invoked on the Java main thread without any internal lock
/// held, so it's fine to query the [`ApplicationContext`] from within them.
pub trait NativeApplication: Send + Sync {
    /// Called once the base `onCreate()` has returned
    fn on_create(&self, _app: &ApplicationContext) {}

    fn configuration_changed(
        &self,
        handle: BoundHandle,
        config: &Configuration,
        changes: ConfigChanges,
    );

    /// The system is running low on memory. Try to reduce your memory use.
    fn low_memory(&self, handle: BoundHandle);

    /// The application is terminating and `handle` is no longer bound
    fn unbind(&self, _handle: BoundHandle) {}
}

/// The outcome of forwarding one lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The native side was notified with this handle
    Delivered(BoundHandle),
    /// No handle was bound so nothing was forwarded
    Unbound,
}

/// Where the application is in its (host imposed) lifecycle
///
/// This is only tracked for diagnostics; out of order callbacks are logged
/// but still handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Constructed,
    Created,
    Terminated,
}

struct ApplicationInner {
    state: LifecycleState,
    handle: NativeHandle,
    config: ConfigurationRef,
    build: Option<BuildInfo>,
}

/// A (cheaply clonable) reference to the running application
///
/// This is handed to anything that needs to know about the application
/// instead of a process-wide singleton. Clones observe the same state.
///
/// A context doesn't own the [`NativeApplication`], so it's fine for the
/// native side to keep the context it receives in
/// [`on_create()`](NativeApplication::on_create).
#[derive(Clone)]
pub struct ApplicationContext {
    inner: Arc<RwLock<ApplicationInner>>,
}

impl PartialEq for ApplicationContext {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
impl Eq for ApplicationContext {}

impl Hash for ApplicationContext {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read().unwrap();
        f.debug_struct("ApplicationContext")
            .field("state", &inner.state)
            .field("handle", &inner.handle)
            .field("build", &inner.build)
            .finish_non_exhaustive()
    }
}

impl ApplicationContext {
    fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ApplicationInner {
                state: LifecycleState::Constructed,
                handle: NativeHandle::Unbound,
                config: ConfigurationRef::new(Configuration::default()),
                build: None,
            })),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.read().unwrap().state
    }

    pub fn native_handle(&self) -> NativeHandle {
        self.inner.read().unwrap().handle
    }

    /// Binds the native counterpart, replacing (and returning) any previous
    /// handle
    ///
    /// Setting `0` / [`NativeHandle::Unbound`] stops events from being
    /// forwarded.
    pub fn set_native(&self, handle: impl Into<NativeHandle>) -> NativeHandle {
        let handle = handle.into();
        debug!("Set native handle: {:?}", handle);
        mem::replace(&mut self.inner.write().unwrap().handle, handle)
    }

    /// Returns a (cheaply clonable) reference to the latest [`Configuration`]
    pub fn config(&self) -> ConfigurationRef {
        self.inner.read().unwrap().config.clone()
    }

    pub fn build_info(&self) -> Option<BuildInfo> {
        self.inner.read().unwrap().build.clone()
    }

    /// `false` if the build details are unknown
    pub fn is_emulator(&self) -> bool {
        self.inner
            .read()
            .unwrap()
            .build
            .as_ref()
            .map_or(false, BuildInfo::is_emulator)
    }
}

/// Forwards `android.app.Application` lifecycle callbacks to a
/// [`NativeApplication`]
///
/// There is one `Application` per Java application object. Its context is
/// published by [`on_create()`](Self::on_create) and withdrawn again by
/// [`on_terminate()`](Self::on_terminate), see [`current()`](Self::current).
///
/// All methods take `&self`: lifecycle callbacks arrive on the Java main
/// thread while `setNative()` may be called from any thread.
pub struct Application {
    context: ApplicationContext,
    native: Arc<dyn NativeApplication>,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Application {
    pub fn new(native: Arc<dyn NativeApplication>) -> Self {
        Self {
            context: ApplicationContext::new(),
            native,
        }
    }

    /// The context for this application, regardless of lifecycle state
    pub fn context(&self) -> &ApplicationContext {
        &self.context
    }

    /// The published context: `Some` between `on_create()` and
    /// `on_terminate()`
    pub fn current(&self) -> Option<ApplicationContext> {
        match self.context.state() {
            LifecycleState::Created => Some(self.context.clone()),
            _ => None,
        }
    }

    pub fn set_native(&self, handle: impl Into<NativeHandle>) -> NativeHandle {
        self.context.set_native(handle)
    }

    fn forward(&self, event: &str, f: impl FnOnce(&dyn NativeApplication, BoundHandle)) -> Delivery {
        // Copy the handle out so the lock isn't held while calling out
        let handle = self.context.native_handle();
        match handle.bound() {
            Some(handle) => {
                debug!("Forwarding {event} to native handle {handle}");
                f(&*self.native, handle);
                Delivery::Delivered(handle)
            }
            None => {
                debug!("Not forwarding {event}: no native handle bound");
                Delivery::Unbound
            }
        }
    }

    /// Publishes the application context and then runs the base `onCreate()`
    pub fn on_create<H: HostApplication + ?Sized>(
        &self,
        host: &mut H,
        config: Configuration,
        build: Option<BuildInfo>,
    ) -> Result<ApplicationContext> {
        debug!("onCreate");
        {
            let mut inner = self.context.inner.write().unwrap();
            if inner.state != LifecycleState::Constructed {
                warn!("onCreate received while {:?}", inner.state);
            }
            inner.state = LifecycleState::Created;
            inner.config.replace(config);
            inner.build = build;
        }

        host.base_on_create()?;

        self.native.on_create(&self.context);
        Ok(self.context.clone())
    }

    pub fn on_configuration_changed<H: HostApplication + ?Sized>(
        &self,
        host: &mut H,
        new_config: Configuration,
    ) -> Result<Delivery> {
        debug!("onConfigurationChanged");
        host.base_on_configuration_changed()?;

        let changes = self.context.config().replace(new_config.clone());
        debug!("Configuration changes: {:?}", changes);

        Ok(self.forward("onConfigurationChanged", |native, handle| {
            native.configuration_changed(handle, &new_config, changes)
        }))
    }

    pub fn on_low_memory<H: HostApplication + ?Sized>(&self, host: &mut H) -> Result<Delivery> {
        debug!("onLowMemory");
        host.base_on_low_memory()?;

        Ok(self.forward("onLowMemory", |native, handle| native.low_memory(handle)))
    }

    /// Runs the base `onTerminate()`, unbinds the native handle and withdraws
    /// the application context
    ///
    /// Android makes no promise to call this before the process is killed.
    pub fn on_terminate<H: HostApplication + ?Sized>(&self, host: &mut H) -> Result<Delivery> {
        debug!("onTerminate");
        host.base_on_terminate()?;

        let previous = {
            let mut inner = self.context.inner.write().unwrap();
            if inner.state != LifecycleState::Created {
                warn!("onTerminate received while {:?}", inner.state);
            }
            inner.state = LifecycleState::Terminated;
            mem::take(&mut inner.handle)
        };

        Ok(match previous.bound() {
            Some(handle) => {
                debug!("Unbinding native handle {handle}");
                self.native.unbind(handle);
                Delivery::Delivered(handle)
            }
            None => Delivery::Unbound,
        })
    }
}

#[test]
fn test_context_is_send_sync() {
    fn needs_send_sync<T: Send + Sync>() {}
    needs_send_sync::<ApplicationContext>();
    needs_send_sync::<Application>();
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;

    #[derive(Default)]
    struct NullHost {
        fail: bool,
    }

    impl HostApplication for NullHost {
        fn base_on_create(&mut self) -> Result<()> {
            Ok(())
        }
        fn base_on_configuration_changed(&mut self) -> Result<()> {
            if self.fail {
                return Err(AppError::JavaError("super threw".to_string()));
            }
            Ok(())
        }
        fn base_on_low_memory(&mut self) -> Result<()> {
            Ok(())
        }
        fn base_on_terminate(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingNative {
        low_memory: Mutex<Vec<i64>>,
        configs: Mutex<Vec<(i64, ConfigChanges)>>,
    }

    impl NativeApplication for CountingNative {
        fn configuration_changed(
            &self,
            handle: BoundHandle,
            _config: &Configuration,
            changes: ConfigChanges,
        ) {
            self.configs.lock().unwrap().push((handle.get(), changes));
        }

        fn low_memory(&self, handle: BoundHandle) {
            self.low_memory.lock().unwrap().push(handle.get());
        }
    }

    fn created(native: Arc<CountingNative>) -> Application {
        let app = Application::new(native);
        app.on_create(&mut NullHost::default(), Configuration::default(), None)
            .unwrap();
        app
    }

    #[test]
    fn current_follows_lifecycle() {
        let app = Application::new(Arc::new(CountingNative::default()));
        assert!(app.current().is_none());

        let context = app
            .on_create(&mut NullHost::default(), Configuration::default(), None)
            .unwrap();
        assert_eq!(app.current(), Some(context.clone()));

        app.on_terminate(&mut NullHost::default()).unwrap();
        assert!(app.current().is_none());
        assert_eq!(context.state(), LifecycleState::Terminated);
    }

    #[test]
    fn unbound_handle_is_not_forwarded() {
        let native = Arc::new(CountingNative::default());
        let app = created(native.clone());

        let delivery = app.on_low_memory(&mut NullHost::default()).unwrap();
        assert_eq!(delivery, Delivery::Unbound);
        assert!(native.low_memory.lock().unwrap().is_empty());
    }

    #[test]
    fn set_native_replaces_previous() {
        let app = created(Arc::new(CountingNative::default()));
        assert_eq!(app.set_native(7i64), NativeHandle::Unbound);
        assert_eq!(app.set_native(9i64).into_raw(), 7);
        assert_eq!(app.context().native_handle().into_raw(), 9);

        app.set_native(0i64);
        assert_eq!(app.context().native_handle(), NativeHandle::Unbound);
    }

    #[test]
    fn base_failure_skips_forward() {
        let native = Arc::new(CountingNative::default());
        let app = created(native.clone());
        app.set_native(5i64);

        let mut host = NullHost { fail: true };
        assert!(app
            .on_configuration_changed(&mut host, Configuration::default())
            .is_err());
        assert!(native.configs.lock().unwrap().is_empty());
    }

    #[test]
    fn configuration_changes_are_reported() {
        let native = Arc::new(CountingNative::default());
        let app = created(native.clone());
        app.set_native(5i64);

        let mut config = Configuration::default();
        config.density_dpi = Some(480);
        app.on_configuration_changed(&mut NullHost::default(), config)
            .unwrap();

        assert_eq!(
            *native.configs.lock().unwrap(),
            vec![(5, ConfigChanges::DENSITY)]
        );
        assert_eq!(app.context().config().density_dpi(), Some(480));
    }

    #[test]
    fn context_identity() {
        let a = created(Arc::new(CountingNative::default()));
        let b = created(Arc::new(CountingNative::default()));
        assert_eq!(a.context(), &a.context().clone());
        assert_ne!(a.context(), b.context());
    }

    #[test]
    fn is_emulator_without_build_info() {
        let app = created(Arc::new(CountingNative::default()));
        assert!(!app.context().is_emulator());
    }
}
