use javelin_util::errors::JavelinError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = JavelinError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_manifest_error_display() {
    let err = JavelinError::Manifest {
        message: "bad syntax".to_string(),
    };
    assert_eq!(err.to_string(), "Manifest error: bad syntax");
}

#[test]
fn test_input_error_display() {
    let err = JavelinError::Input {
        message: "unknown alias key :jvm-optz".to_string(),
    };
    assert_eq!(err.to_string(), "Invalid input: unknown alias key :jvm-optz");
}

#[test]
fn test_resolution_error_display() {
    let err = JavelinError::resolution("org.clojure/clojure", "pom not found");
    assert_eq!(
        err.to_string(),
        "Resolution of org.clojure/clojure failed: pom not found"
    );
}

#[test]
fn test_resolution_error_keeps_coord() {
    let err = JavelinError::Resolution {
        lib: "a/b".to_string(),
        coord: Some("1.2.3".to_string()),
        message: "boom".to_string(),
    };
    match err {
        JavelinError::Resolution { coord, .. } => assert_eq!(coord.as_deref(), Some("1.2.3")),
        other => panic!("unexpected variant: {other}"),
    }
}

#[test]
fn test_network_error_display() {
    let err = JavelinError::Network {
        message: "timeout".to_string(),
    };
    assert_eq!(err.to_string(), "Network error: timeout");
}

#[test]
fn test_invariant_error_display() {
    let err = JavelinError::Invariant {
        message: "parent not selected".to_string(),
    };
    assert!(err.to_string().contains("invariant"), "got: {err}");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: JavelinError = io_err.into();
    assert!(matches!(err, JavelinError::Io(_)));
}
