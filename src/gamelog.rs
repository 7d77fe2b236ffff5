use bracket_terminal::prelude::RGB;

const LOG_CAPACITY: usize = 64;

pub const GRAY: RGB = RGB {
    r: 0.6,
    g: 0.6,
    b: 0.6,
};
pub const GOOD: RGB = RGB {
    r: 0.3,
    g: 1.0,
    b: 0.3,
};
pub const WARN: RGB = RGB {
    r: 1.0,
    g: 1.0,
    b: 0.3,
};
pub const BAD: RGB = RGB {
    r: 1.0,
    g: 0.35,
    b: 0.35,
};
pub const MAGIC: RGB = RGB {
    r: 0.45,
    g: 0.65,
    b: 1.0,
};

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub color: RGB,
}

/// Player-facing messages, oldest first.
#[derive(Clone, Debug, Default)]
pub struct GameLog {
    entries: Vec<LogEntry>,
}

impl GameLog {
    pub fn push<S: Into<String>>(&mut self, text: S, color: RGB) {
        self.entries.push(LogEntry {
            text: text.into(),
            color,
        });
        if self.entries.len() > LOG_CAPACITY {
            let overflow = self.entries.len() - LOG_CAPACITY;
            self.entries.drain(..overflow);
        }
    }

    pub fn recent(&self, count: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    #[cfg(test)]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.text.contains(needle))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_newest_entries() {
        let mut log = GameLog::default();
        for idx in 0..(LOG_CAPACITY + 10) {
            log.push(format!("line {idx}"), GRAY);
        }
        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.recent(1)[0].text, format!("line {}", LOG_CAPACITY + 9));
        assert!(!log.contains("line 9 "));
    }

    #[test]
    fn recent_handles_short_logs() {
        let mut log = GameLog::default();
        log.push("hello", GOOD);
        assert_eq!(log.recent(6).len(), 1);
        assert_eq!(log.recent(6)[0].text, "hello");
    }
}
