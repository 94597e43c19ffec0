use std::{
    borrow::Cow,
    fmt::{self, Write as _},
    process,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing::{Event, Level, Subscriber, field::Field};
use tracing_subscriber::{
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    registry::LookupSpan,
};

use crate::{
    severity::{RESET, Severity},
    template::{Key, Resolve, Template, Value},
};

/// Boolean event field that promotes an `ERROR` event to [`Severity::Critical`].
pub const CRITICAL_FIELD: &str = "critical";

const LOG_FILE_FIELD: &str = "log.file";
const LOG_LINE_FIELD: &str = "log.line";
const UNKNOWN_FILE: &str = "(unknown file)";
const UNNAMED_THREAD: &str = "<unnamed>";

/// One log record as seen by the formatter.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub severity: Severity,
    pub message: Cow<'a, str>,
    pub file: Option<Cow<'a, str>>,
    pub line: Option<u32>,
    pub module: Option<&'a str>,
    pub time: OffsetDateTime,
    pub process: u32,
    pub thread_name: Option<String>,
}

impl<'a> Record<'a> {
    pub fn new(severity: Severity, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: None,
            line: None,
            module: None,
            time: OffsetDateTime::now_utc(),
            process: process::id(),
            thread_name: thread::current().name().map(str::to_string),
        }
    }

    pub fn at(mut self, file: impl Into<Cow<'a, str>>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

/// Renders records through a [`Template`], coloring the severity label.
///
/// The color flag can be shared with the owner of the formatter, so toggling
/// it reaches a formatter that already sits inside a handler.
///
/// As a `tracing` event formatter it also drops events below its minimum
/// severity: `EnvFilter` stops at `ERROR` and cannot tell a critical event
/// from a plain one.
#[derive(Debug, Clone)]
pub struct ColorFormatter {
    template: Template,
    name: Arc<str>,
    use_color: Arc<AtomicBool>,
    level: Severity,
    offset: UtcOffset,
}

impl ColorFormatter {
    /// Formatter for logger `"root"` with color enabled, admitting every severity.
    pub fn new(template: Template) -> Self {
        Self::shared(
            template,
            Arc::from("root"),
            Arc::new(AtomicBool::new(true)),
            Severity::Trace,
        )
    }

    pub(crate) fn shared(
        template: Template,
        name: Arc<str>,
        use_color: Arc<AtomicBool>,
        level: Severity,
    ) -> Self {
        Self {
            template,
            name,
            use_color,
            level,
            offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }

    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    #[inline]
    pub fn set_use_color(&self, enabled: bool) {
        self.use_color.store(enabled, Ordering::Relaxed);
    }

    #[inline]
    pub fn use_color(&self) -> bool {
        self.use_color.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Renders `record` without a trailing newline.
    pub fn format(&self, record: &Record<'_>) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_record(&mut out, record);
        out
    }

    fn write_record<W>(&self, out: &mut W, record: &Record<'_>) -> fmt::Result
    where
        W: fmt::Write + ?Sized,
    {
        let label = match record.severity.color() {
            Some(color) if self.use_color() => Label::Painted {
                open: color.sequence(),
                text: format!("{}:", record.severity.name()),
            },
            _ => Label::Plain(record.severity.name()),
        };
        let asctime = if self.template.uses(Key::AscTime) {
            record.time.to_offset(self.offset).format(&Rfc3339).unwrap_or_default()
        } else {
            String::new()
        };

        let view = View {
            record,
            name: &self.name,
            label,
            asctime,
        };
        self.template.render(out, &view)
    }
}

impl<S, N> FormatEvent<S, N> for ColorFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut fields = EventFields::new(*meta.level() == Level::ERROR);
        event.record(&mut fields);

        let severity = if fields.critical {
            Severity::Critical
        } else {
            Severity::from(*meta.level())
        };
        if severity < self.level {
            return Ok(());
        }

        // A caller location overrides the metadata, whose module is then the
        // emitting logger's own.
        let (file, module) = match fields.file.take() {
            Some(file) => (Some(Cow::Owned(file)), None),
            None => (
                meta.file().map(Cow::Borrowed),
                meta.module_path().or(Some(meta.target())),
            ),
        };
        let line = fields.line.or(meta.line());
        let record = Record {
            severity,
            message: Cow::Owned(fields.into_message()),
            file,
            line,
            module,
            time: OffsetDateTime::now_utc(),
            process: process::id(),
            thread_name: thread::current().name().map(str::to_string),
        };

        self.write_record(&mut writer, &record)?;
        writeln!(writer)
    }
}

enum Label {
    Plain(&'static str),
    Painted { open: &'static str, text: String },
}

struct View<'r, 'a> {
    record: &'r Record<'a>,
    name: &'r str,
    label: Label,
    asctime: String,
}

impl Resolve for View<'_, '_> {
    fn resolve(&self, key: Key) -> Value<'_> {
        let record = self.record;
        match key {
            Key::Name => Value::Text(self.name),
            Key::LevelName => match &self.label {
                Label::Plain(text) => Value::Text(text),
                Label::Painted { open, text } => Value::Painted {
                    open,
                    text,
                    close: RESET,
                },
            },
            Key::LevelNo => Value::Number(u64::from(record.severity.value())),
            Key::Message => Value::Text(&record.message),
            Key::PathName => Value::Text(record.file.as_deref().unwrap_or(UNKNOWN_FILE)),
            Key::FileName => Value::Text(
                record
                    .file
                    .as_deref()
                    .map(basename)
                    .unwrap_or(UNKNOWN_FILE),
            ),
            Key::LineNo => Value::Number(u64::from(record.line.unwrap_or(0))),
            Key::Module => Value::Text(
                record
                    .module
                    .or_else(|| record.file.as_deref().map(stem))
                    .unwrap_or(""),
            ),
            Key::AscTime => Value::Text(&self.asctime),
            Key::Process => Value::Number(u64::from(record.process)),
            Key::ThreadName => {
                Value::Text(record.thread_name.as_deref().unwrap_or(UNNAMED_THREAD))
            }
        }
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn stem(path: &str) -> &str {
    let name = basename(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Splits an event into its message, its remaining fields and the
/// bookkeeping fields the formatter consumes.
///
/// The critical marker is consumed only on `ERROR` events; elsewhere it is an
/// ordinary field.
struct EventFields {
    message: String,
    extra: String,
    file: Option<String>,
    line: Option<u32>,
    promotable: bool,
    critical: bool,
}

impl EventFields {
    fn new(promotable: bool) -> Self {
        Self {
            message: String::new(),
            extra: String::new(),
            file: None,
            line: None,
            promotable,
            critical: false,
        }
    }

    fn into_message(self) -> String {
        let mut message = self.message;
        message.push_str(&self.extra);
        message
    }
}

impl tracing::field::Visit for EventFields {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if self.promotable && field.name() == CRITICAL_FIELD {
            self.critical = value;
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == LOG_LINE_FIELD {
            self.line = u32::try_from(value).ok();
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            LOG_FILE_FIELD => self.file = Some(value.to_string()),
            "message" => self.message.push_str(value),
            _ => self.record_debug(field, &value),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => {
                let _ = write!(self.message, "{value:?}");
            }
            name if name.starts_with("log.") => {}
            name => {
                let _ = write!(self.extra, " {name}={value:?}");
            }
        }
    }
}
