use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Java VM or JNI error, including Java exceptions: {0}")]
    JavaError(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

// XXX: we don't want to expose jni-rs in the public API so the JNI
// plumbing uses this internal error type which is stripped down to an
// `AppError` at the API boundary.
//
// This way we avoid exposing a public trait implementation for
// `From<jni::errors::Error>`
#[derive(Error, Debug)]
pub(crate) enum InternalAppError {
    #[error("A JNI error")]
    JniError(jni::errors::JniError),
    #[error("A Java Exception was thrown via a JNI method call: {0}")]
    JniException(String),
    #[error("A Java VM error")]
    JvmError(jni::errors::Error),
}

pub(crate) type InternalResult<T> = std::result::Result<T, InternalAppError>;

impl From<jni::errors::Error> for InternalAppError {
    fn from(value: jni::errors::Error) -> Self {
        InternalAppError::JvmError(value)
    }
}
impl From<jni::errors::JniError> for InternalAppError {
    fn from(value: jni::errors::JniError) -> Self {
        InternalAppError::JniError(value)
    }
}

impl From<InternalAppError> for AppError {
    fn from(value: InternalAppError) -> Self {
        match value {
            InternalAppError::JniError(err) => AppError::JavaError(err.to_string()),
            InternalAppError::JniException(msg) => AppError::JavaError(msg),
            InternalAppError::JvmError(err) => AppError::JavaError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exception_message_survives_conversion() {
        let err: AppError = InternalAppError::JniException("boom".to_string()).into();
        let AppError::JavaError(msg) = err;
        assert_eq!(msg, "boom");
    }

    #[test]
    fn jvm_error_converts() {
        let err: InternalAppError = jni::errors::Error::JavaException.into();
        assert!(matches!(AppError::from(err), AppError::JavaError(_)));
    }
}
