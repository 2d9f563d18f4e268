use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// JSON-lines event log owned by a single layout context.
///
/// Every event bumps a counter named after its type; `finish` writes those counts as a
/// closing `debug.summary` line.
pub(crate) struct DebugLogger {
    state: Mutex<LogState>,
}

struct LogState {
    writer: BufWriter<File>,
    counts: BTreeMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            state: Mutex::new(LogState {
                writer: BufWriter::new(file),
                counts: BTreeMap::new(),
            }),
        })
    }

    /// Logs `{"type":kind,...fields}`. Field values must already be JSON.
    pub fn event(&self, kind: &str, fields: &[(&str, String)]) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let line = json_object(
            std::iter::once(("type", json_str(kind)))
                .chain(fields.iter().map(|(key, value)| (*key, value.clone()))),
        );
        let _ = writeln!(state.writer, "{line}");
        let count = state.counts.entry(kind.to_string()).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Writes the per-type counts and flushes the file.
    pub fn finish(self, context: &str) {
        let mut state = match self.state.into_inner() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let counts = json_object(
            state
                .counts
                .iter()
                .map(|(kind, count)| (kind.as_str(), count.to_string())),
        );
        let line = json_object([
            ("type", json_str("debug.summary")),
            ("context", json_str(context)),
            ("counts", counts),
        ]);
        let _ = writeln!(state.writer, "{line}");
        let _ = state.writer.flush();
    }
}

fn json_object<'a>(entries: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let mut out = String::from("{");
    for (idx, (key, value)) in entries.into_iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&json_str(key));
        out.push(':');
        out.push_str(&value);
    }
    out.push('}');
    out
}

pub(crate) fn json_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn json_str(raw: &str) -> String {
    format!("\"{}\"", json_escape(raw))
}
