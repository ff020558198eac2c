use std::io;

#[cfg(unix)]
const CROSS_DEVICE_CODE: i32 = 18; // EXDEV

#[cfg(windows)]
const CROSS_DEVICE_CODE: i32 = 17; // ERROR_NOT_SAME_DEVICE

/// True when a rename failed because source and target live on different volumes.
#[cfg(any(unix, windows))]
pub fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(CROSS_DEVICE_CODE)
}

#[cfg(not(any(unix, windows)))]
pub fn is_cross_device(_err: &io::Error) -> bool {
    false
}

/// Errors worth retrying: the same call may succeed a moment later.
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(is_transient(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::NotFound)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }

    #[cfg(unix)]
    #[test]
    fn test_cross_device_code() {
        assert!(is_cross_device(&io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device(&io::Error::from_raw_os_error(2)));
    }
}
