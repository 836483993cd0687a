use crate::connectivity::DetectionError;
use crate::Error;

#[test]
fn test_init_is_idempotent() {
    crate::init();
    crate::init();
}

#[test]
fn test_error_exit_codes() {
    assert_eq!(Error::Config("bad".to_string()).exit_code(), 1);
    assert_eq!(
        Error::from(DetectionError::InterfaceEnumeration("gone".to_string())).exit_code(),
        2
    );
    assert_eq!(Error::from(DetectionError::Timeout).exit_code(), 3);
    assert_eq!(
        Error::from(DetectionError::InvalidResponse("junk".to_string())).exit_code(),
        4
    );
}

#[test]
fn test_detection_error_display_is_transparent() {
    let err = Error::from(DetectionError::MissingAttribute);
    assert_eq!(
        err.to_string(),
        "STUN response has no XOR-MAPPED-ADDRESS attribute"
    );
}
