/// Lines entered into the command palette, oldest first, with a cursor for up/down
/// navigation.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<String>,
    /// `entries.len()` means "past the newest entry"
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line and reset the cursor past the newest entry.
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
        self.cursor = self.entries.len();
    }

    /// One step back. Stays at the oldest entry once it's reached.
    pub fn previous(&mut self) -> &str {
        if self.entries.is_empty() {
            return "";
        }
        self.cursor = self.cursor.saturating_sub(1);
        &self.entries[self.cursor]
    }

    /// One step forward. Past the newest entry this returns an empty line.
    pub fn next(&mut self) -> &str {
        if self.entries.is_empty() {
            return "";
        }
        self.cursor = (self.cursor + 1).min(self.entries.len());
        self.entries
            .get(self.cursor)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
