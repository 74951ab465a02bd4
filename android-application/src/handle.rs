use std::fmt;
use std::num::NonZeroI64;

/// The identity of a bound native-side object
///
/// This can only be constructed from a non-zero value, so a collaborator that
/// receives a `BoundHandle` never has to check for the "unbound" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundHandle(NonZeroI64);

impl BoundHandle {
    /// Returns `None` for `0`, which Java uses to mean "unbound"
    pub fn new(raw: i64) -> Option<Self> {
        NonZeroI64::new(raw).map(Self)
    }

    pub fn get(self) -> i64 {
        self.0.get()
    }
}

impl fmt::Display for BoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0.get())
    }
}

/// An opaque handle identifying the native counterpart of the application
///
/// On the Java side this is a plain `long` where `0` means nothing has been
/// bound yet. Here the two states are distinct variants so that forwarding
/// code has to decide what to do with an unbound handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NativeHandle {
    #[default]
    Unbound,
    Bound(BoundHandle),
}

impl NativeHandle {
    pub fn from_raw(raw: i64) -> Self {
        match BoundHandle::new(raw) {
            Some(handle) => NativeHandle::Bound(handle),
            None => NativeHandle::Unbound,
        }
    }

    /// The Java representation of this handle (`0` when unbound)
    pub fn into_raw(self) -> i64 {
        match self {
            NativeHandle::Unbound => 0,
            NativeHandle::Bound(handle) => handle.get(),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, NativeHandle::Bound(_))
    }

    pub fn bound(self) -> Option<BoundHandle> {
        match self {
            NativeHandle::Unbound => None,
            NativeHandle::Bound(handle) => Some(handle),
        }
    }
}

impl From<i64> for NativeHandle {
    fn from(raw: i64) -> Self {
        NativeHandle::from_raw(raw)
    }
}

impl From<NativeHandle> for i64 {
    fn from(handle: NativeHandle) -> Self {
        handle.into_raw()
    }
}

impl From<BoundHandle> for NativeHandle {
    fn from(handle: BoundHandle) -> Self {
        NativeHandle::Bound(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_unbound() {
        assert_eq!(NativeHandle::from_raw(0), NativeHandle::Unbound);
        assert_eq!(NativeHandle::default(), NativeHandle::Unbound);
        assert_eq!(NativeHandle::Unbound.into_raw(), 0);
        assert!(BoundHandle::new(0).is_none());
    }

    #[test]
    fn non_zero_is_bound() {
        let handle = NativeHandle::from(42i64);
        assert!(handle.is_bound());
        assert_eq!(handle.bound().map(BoundHandle::get), Some(42));
        assert_eq!(i64::from(handle), 42);

        // Pointers above i64::MAX arrive from Java as negative longs
        let handle = NativeHandle::from_raw(-8);
        assert_eq!(handle.into_raw(), -8);
    }

    #[test]
    fn display_is_hex() {
        let handle = BoundHandle::new(255).unwrap();
        assert_eq!(handle.to_string(), "0xff");
    }
}
