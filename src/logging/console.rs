//! Console text sink
//!
//! Writes one line per message to stderr (or any writer), as plain text or
//! as JSON lines for machine consumption.

use super::filter::MessageFilter;
use super::sinks::TextSink;
use super::{LogLevel, LogMessage};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Line format of text sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    level: LogLevel,
    domain: &'a str,
    message: &'a str,
}

pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    format: TextFormat,
    filter: MessageFilter,
}

impl ConsoleSink {
    /// Console sink on stderr
    pub fn stderr(level: LogLevel, format: TextFormat) -> Self {
        Self::with_writer(io::stderr(), MessageFilter::with_level(level), format)
    }

    pub fn with_writer(
        writer: impl Write + Send + 'static,
        filter: MessageFilter,
        format: TextFormat,
    ) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            format,
            filter,
        }
    }

    fn render(&self, message: &LogMessage) -> io::Result<String> {
        match self.format {
            TextFormat::Text => Ok(message.to_line()),
            TextFormat::Json => serde_json::to_string(&JsonLine {
                timestamp: message.timestamp().to_rfc3339(),
                level: message.level(),
                domain: message.domain().native_name(),
                message: message.text(),
            })
            .map_err(io::Error::other),
        }
    }
}

impl TextSink for ConsoleSink {
    fn level(&self) -> LogLevel {
        self.filter.level
    }

    fn write(&self, message: &LogMessage) -> io::Result<()> {
        if !self.filter.matches(message) {
            return Ok(());
        }
        let line = self.render(message)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
    }

    fn release(&self) {
        let _ = self.writer.lock().flush();
    }
}
