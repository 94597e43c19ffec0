use tint_observe::{ColorLogger, LoggerConfig, LoggerError, logger_init};

// Own test binary: the global default can be set once per process.
#[test]
fn global_default_is_installed_once() {
    let cfg = LoggerConfig {
        use_color: false,
        ..Default::default()
    };
    let logger = logger_init(&cfg).unwrap();
    logger.info("installed");

    let second = ColorLogger::new(&cfg).unwrap();
    assert!(matches!(second.init(), Err(LoggerError::AlreadyInitialized)));
}
