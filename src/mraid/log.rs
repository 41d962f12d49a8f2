use chrono::{DateTime, Local};

/// User-facing, append-only harness log.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    lines: Vec<String>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: impl AsRef<str>) {
        self.append_at(Local::now(), message);
    }

    pub fn append_at(&mut self, at: DateTime<Local>, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::info!(target: "playdeck::harness", "{message}");
        self.lines
            .push(format!("[{}] {message}", at.format("%H:%M:%S")));
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn appends_timestamped_lines_and_clears() {
        let at = Local.with_ymd_and_hms(2026, 1, 2, 9, 5, 7).unwrap();
        let mut log = ActionLog::new();
        log.append_at(at, "first");
        log.append_at(at, "second");

        assert_eq!(log.lines(), ["[09:05:07] first", "[09:05:07] second"]);
        assert_eq!(log.text(), "[09:05:07] first\n[09:05:07] second\n");

        log.clear();
        assert!(log.is_empty());
    }
}
