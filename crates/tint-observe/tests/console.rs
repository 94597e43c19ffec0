use std::{
    io,
    sync::{Arc, Mutex},
    thread,
};

use tint_observe::{
    ColorLogger, DEFAULT_FORMAT, LEVEL_ONLY_FORMAT, LoggerConfig, Severity,
};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8(buf.clone())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn logger(format: &str, use_color: bool) -> (ColorLogger, Capture) {
    let cfg = LoggerConfig {
        format: format.to_string(),
        use_color,
        level: Severity::Trace,
        ..Default::default()
    };
    let out = Capture::default();
    let logger = ColorLogger::with_writer(&cfg, out.clone()).unwrap();
    (logger, out)
}

#[test]
fn info_without_color_is_right_justified() {
    let (logger, out) = logger(LEVEL_ONLY_FORMAT, false);
    logger.info("hello");
    assert_eq!(out.lines(), ["    INFO hello"]);
}

#[test]
fn error_with_color_wraps_label() {
    let (logger, out) = logger(LEVEL_ONLY_FORMAT, true);
    logger.error("boom");

    let lines = out.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("\x1b[1;31mERROR:\x1b[0m boom"), "{:?}", lines[0]);
}

#[test]
fn custom_format_without_color() {
    let (logger, out) = logger("%(levelname)s: %(message)s", false);
    logger.warning("careful");
    assert_eq!(out.lines(), ["WARNING: careful"]);
}

#[test]
fn every_leveled_method_labels_its_severity() {
    let (logger, out) = logger("%(levelname)s %(levelno)d %(message)s", false);
    logger.trace("t");
    logger.debug("d");
    logger.info("i");
    logger.warning("w");
    logger.error("e");
    logger.critical("c");
    assert_eq!(
        out.lines(),
        [
            "TRACE 5 t",
            "DEBUG 10 d",
            "INFO 20 i",
            "WARNING 30 w",
            "ERROR 40 e",
            "CRITICAL 50 c",
        ]
    );
}

#[test]
fn trace_stays_plain_with_color_on() {
    let (logger, out) = logger("%(levelname)s %(message)s", true);
    logger.trace("quiet");
    logger.critical("loud");

    let lines = out.lines();
    assert_eq!(lines[0], "TRACE quiet");
    assert_eq!(lines[1], "\x1b[1;31mCRITICAL:\x1b[0m loud");
}

#[test]
fn default_format_names_the_call_site() {
    let (logger, out) = logger(DEFAULT_FORMAT, false);
    logger.info("where");
    let line = line!() - 1;
    assert_eq!(out.lines(), [format!("    INFO <console.rs:{line}> where")]);
}

#[test]
fn set_format_replaces_the_handler() {
    let (mut logger, out) = logger(LEVEL_ONLY_FORMAT, false);
    logger.set_format("%(levelname)s|%(message)s").unwrap();
    logger.set_format("[%(name)s] %(message)s").unwrap();
    logger.reset_logger().unwrap();

    logger.info("once");
    assert_eq!(out.lines(), ["[root] once"]);
    assert_eq!(logger.format(), "[%(name)s] %(message)s");
}

#[test]
fn color_flag_survives_reconfiguration() {
    let (mut logger, out) = logger(LEVEL_ONLY_FORMAT, true);
    logger.set_use_color(false);
    logger.set_format("%(levelname)s %(message)s").unwrap();
    logger.error("plain");

    logger.set_use_color(true);
    logger.error("painted");

    assert_eq!(
        out.lines(),
        ["ERROR plain", "\x1b[1;31mERROR:\x1b[0m painted"]
    );
}

#[test]
fn toggling_color_twice_is_idempotent() {
    let (logger, out) = logger(LEVEL_ONLY_FORMAT, false);
    logger.set_use_color(true);
    logger.warning("a");
    logger.set_use_color(true);
    logger.warning("a");

    let lines = out.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], lines[1]);
}

#[test]
fn minimum_level_filters_records() {
    let cfg = LoggerConfig {
        format: LEVEL_ONLY_FORMAT.to_string(),
        level: Severity::Warning,
        use_color: false,
        ..Default::default()
    };
    let out = Capture::default();
    let logger = ColorLogger::with_writer(&cfg, out.clone()).unwrap();

    logger.debug("skip");
    logger.info("skip");
    logger.warning("keep");
    logger.error("keep");
    assert_eq!(out.lines(), [" WARNING keep", "   ERROR keep"]);
}

#[test]
fn critical_level_drops_plain_errors() {
    let cfg = LoggerConfig {
        format: LEVEL_ONLY_FORMAT.to_string(),
        level: Severity::Critical,
        use_color: false,
        ..Default::default()
    };
    let out = Capture::default();
    let logger = ColorLogger::with_writer(&cfg, out.clone()).unwrap();

    logger.error("dropped");
    logger.critical("kept");
    logger.in_scope(|| {
        tracing::error!("dropped too");
        tracing::error!(critical = true, "kept too");
    });
    assert_eq!(out.lines(), ["CRITICAL kept", "CRITICAL kept too"]);
}

#[test]
fn critical_marker_only_promotes_errors() {
    let (logger, out) = logger("%(levelname)s %(levelno)d %(message)s", false);
    logger.in_scope(|| {
        tracing::info!(critical = true, "just info");
        tracing::warn!(critical = true, "just a warning");
        tracing::error!(critical = false, "plain error");
    });
    assert_eq!(
        out.lines(),
        [
            "INFO 20 just info critical=true",
            "WARNING 30 just a warning critical=true",
            "ERROR 40 plain error",
        ]
    );
}

#[test]
fn module_names_the_caller() {
    let (logger, out) = logger("%(module)s %(message)s", false);
    logger.info("method");
    logger.in_scope(|| tracing::info!("macro"));
    assert_eq!(out.lines(), ["console method", "console macro"]);
}

#[test]
fn reset_during_emission_keeps_every_line() {
    const LINES: usize = 2000;

    let (mut logger, out) = logger("%(message)s", false);
    let dispatch = logger.dispatch().clone();
    let emitter = thread::spawn(move || {
        tracing::dispatcher::with_default(&dispatch, || {
            for i in 0..LINES {
                tracing::info!("line {i}");
            }
        })
    });

    for _ in 0..200 {
        logger.reset_logger().unwrap();
    }
    emitter.join().unwrap();

    let lines = out.lines();
    assert_eq!(lines.len(), LINES);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line, &format!("line {i}"));
    }
}

#[test]
fn tracing_macros_in_scope_reach_the_logger() {
    let (logger, out) = logger("%(levelname)s: %(message)s", false);
    logger.in_scope(|| {
        tracing::warn!(attempt = 3, "retrying");
        tracing::error!(critical = true, "halt");
        tracing::info!(peer = "10.0.0.1", "connected");
    });
    assert_eq!(
        out.lines(),
        [
            "WARNING: retrying attempt=3",
            "CRITICAL: halt",
            r#"INFO: connected peer="10.0.0.1""#,
        ]
    );
}

#[test]
fn loggers_are_independent() {
    let (first, first_out) = logger("a %(message)s", false);
    let (second, second_out) = logger("b %(message)s", false);
    first.info("one");
    second.info("two");
    assert_eq!(first_out.lines(), ["a one"]);
    assert_eq!(second_out.lines(), ["b two"]);
}
