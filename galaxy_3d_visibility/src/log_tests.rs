//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, DefaultLogger and the error-building macros.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
use crate::error::{Error, Result};
use std::time::SystemTime;

fn create_entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::SpatialContainer".to_string(),
        message: "Created container: 16x16 bins of 64 units".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_are_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Trace.label(), "TRACE");
    assert_eq!(LogSeverity::Warn.label(), "WARN ");
}

// ============================================================================
// LOG ENTRY / DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_log_entry_clone_keeps_location() {
    let entry = create_entry(LogSeverity::Error, Some("zone_graph.rs"), Some(47));
    let cloned = entry.clone();

    assert_eq!(cloned.severity, LogSeverity::Error);
    assert_eq!(cloned.source, entry.source);
    assert_eq!(cloned.file, Some("zone_graph.rs"));
    assert_eq!(cloned.line, Some(47));
}

#[test]
fn test_default_logger_formats_every_severity() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
    ] {
        logger.log(&create_entry(severity, None, None));
    }
    logger.log(&create_entry(LogSeverity::Error, Some("visibility.rs"), Some(12)));
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
    assert_send_sync::<Box<dyn Logger>>();
}

// ============================================================================
// ERROR MACRO TESTS
// ============================================================================

fn register(zone_count: u32) -> Result<u32> {
    if zone_count == 0 {
        crate::engine_bail!("galaxy3d::test", InvalidZone, "manager reports {} zones", zone_count);
    }
    Ok(zone_count)
}

#[test]
fn test_engine_bail_returns_matching_variant() {
    assert_eq!(register(3).unwrap(), 3);

    match register(0) {
        Err(Error::InvalidZone(message)) => assert_eq!(message, "manager reports 0 zones"),
        other => panic!("expected InvalidZone, got {:?}", other),
    }
}

#[test]
fn test_engine_err_builds_without_returning() {
    let err = crate::engine_err!("galaxy3d::test", InvalidConfig, "bin_count must be at least {}", 1);
    assert!(matches!(err, Error::InvalidConfig(ref m) if m == "bin_count must be at least 1"));
}
