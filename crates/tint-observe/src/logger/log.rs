use std::{
    fmt,
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tracing::{Dispatch, debug, dispatcher, error, info, trace, warn};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{
        self as tfmt, MakeWriter,
        format::DefaultFields,
        writer::BoxMakeWriter,
    },
    layer::{Layered, SubscriberExt},
    reload,
};

use crate::{
    formatter::ColorFormatter,
    logger::{config::LoggerConfig, error::LoggerError},
    severity::Severity,
    template::Template,
};

type Base = Layered<EnvFilter, Registry>;
type Handler = tfmt::Layer<Base, DefaultFields, ColorFormatter, BoxMakeWriter>;
type WriterFactory = Arc<dyn Fn() -> BoxMakeWriter + Send + Sync>;

/// A console logger whose severity labels are colored.
///
/// Owns one [`ColorFormatter`] and one console handler. The handler sits in a
/// single reload slot of a private [`Dispatch`], so reconfiguring replaces it
/// and a record is never written twice.
///
/// Records reach the logger through its leveled methods, through plain
/// `tracing` macros inside [`ColorLogger::in_scope`], or everywhere once
/// [`ColorLogger::init`] made it the global default.
pub struct ColorLogger {
    name: Arc<str>,
    level: Severity,
    template: Template,
    use_color: Arc<AtomicBool>,
    writer: WriterFactory,
    handle: reload::Handle<Handler, Base>,
    dispatch: Dispatch,
}

impl ColorLogger {
    /// Logger writing to the configured console stream.
    pub fn new(cfg: &LoggerConfig) -> Result<Self, LoggerError> {
        let console = cfg.console;
        Self::build(cfg, Arc::new(move || console.make_writer()))
    }

    /// Logger writing to `make_writer` instead of a console stream.
    pub fn with_writer<M>(cfg: &LoggerConfig, make_writer: M) -> Result<Self, LoggerError>
    where
        M: for<'a> MakeWriter<'a> + Clone + Send + Sync + 'static,
    {
        Self::build(cfg, Arc::new(move || BoxMakeWriter::new(make_writer.clone())))
    }

    fn build(cfg: &LoggerConfig, writer: WriterFactory) -> Result<Self, LoggerError> {
        let template = mk_template(&cfg.format)?;
        let filter = mk_filter(cfg.level)?;
        let name: Arc<str> = Arc::from(cfg.name.as_str());
        let use_color = Arc::new(AtomicBool::new(cfg.use_color));

        let formatter = ColorFormatter::shared(
            template.clone(),
            name.clone(),
            use_color.clone(),
            cfg.level,
        );
        let (slot, handle) = reload::Layer::new(mk_handler(formatter, &writer));
        let dispatch = Dispatch::new(tracing_subscriber::registry().with(filter).with(slot));

        Ok(Self {
            name,
            level: cfg.level,
            template,
            use_color,
            writer,
            handle,
            dispatch,
        })
    }

    /// Compiles `format` and installs a fresh handler rendering with it.
    ///
    /// On error the current template and handler stay in place.
    pub fn set_format(&mut self, format: &str) -> Result<(), LoggerError> {
        self.template = mk_template(format)?;
        self.reset_logger()
    }

    /// Replaces the formatter and console handler with fresh ones built from
    /// the current template. The previous handler is dropped.
    pub fn reset_logger(&mut self) -> Result<(), LoggerError> {
        let formatter = ColorFormatter::shared(
            self.template.clone(),
            self.name.clone(),
            self.use_color.clone(),
            self.level,
        );
        self.handle
            .reload(mk_handler(formatter, &self.writer))
            .map_err(|e| LoggerError::ReloadFailed(e.to_string()))
    }

    /// Toggles label coloring; takes effect for the next record.
    pub fn set_use_color(&self, enabled: bool) {
        self.use_color.store(enabled, Ordering::Relaxed);
    }

    #[inline]
    pub fn use_color(&self) -> bool {
        self.use_color.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn level(&self) -> Severity {
        self.level
    }

    #[inline]
    pub fn format(&self) -> &str {
        self.template.source()
    }

    #[inline]
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Runs `f` with this logger as the thread's default dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }

    /// Installs this logger as the process-wide default dispatcher.
    pub fn init(&self) -> Result<(), LoggerError> {
        dispatcher::set_global_default(self.dispatch.clone())
            .map_err(|_| LoggerError::AlreadyInitialized)
    }

    #[track_caller]
    pub fn trace(&self, message: impl fmt::Display) {
        self.log(Severity::Trace, &message, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Severity::Debug, &message, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(Severity::Info, &message, Location::caller());
    }

    #[track_caller]
    pub fn warning(&self, message: impl fmt::Display) {
        self.log(Severity::Warning, &message, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(Severity::Error, &message, Location::caller());
    }

    #[track_caller]
    pub fn critical(&self, message: impl fmt::Display) {
        self.log(Severity::Critical, &message, Location::caller());
    }

    /// Emits `message` at `severity`, attributed to `at`. Severities below
    /// the logger's level are dropped.
    pub fn log(&self, severity: Severity, message: &dyn fmt::Display, at: &Location<'_>) {
        if severity < self.level {
            return;
        }
        let (file, line) = (at.file(), at.line());
        self.in_scope(|| match severity {
            Severity::Trace => trace!(log.file = file, log.line = line, "{message}"),
            Severity::Debug => debug!(log.file = file, log.line = line, "{message}"),
            Severity::Info => info!(log.file = file, log.line = line, "{message}"),
            Severity::Warning => warn!(log.file = file, log.line = line, "{message}"),
            Severity::Error => error!(log.file = file, log.line = line, "{message}"),
            Severity::Critical => {
                error!(critical = true, log.file = file, log.line = line, "{message}")
            }
        });
    }
}

impl fmt::Debug for ColorLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorLogger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("format", &self.template.source())
            .field("use_color", &self.use_color())
            .finish_non_exhaustive()
    }
}

fn mk_template(format: &str) -> Result<Template, LoggerError> {
    Template::parse(format).map_err(|source| LoggerError::InvalidTemplate {
        template: format.to_string(),
        source,
    })
}

fn mk_filter(level: Severity) -> Result<EnvFilter, LoggerError> {
    let directive = level.filter_directive();
    EnvFilter::try_new(directive).map_err(|_| LoggerError::InvalidLogLevel(directive.to_string()))
}

fn mk_handler(formatter: ColorFormatter, writer: &WriterFactory) -> Handler {
    tfmt::layer().event_format(formatter).with_writer(writer())
}
