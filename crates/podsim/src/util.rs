//! Various utility structs.

/// A simple incrementing counter.
pub struct Counter {
    value: u64,
}

impl Default for Counter {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

impl Counter {
    /// Creates a counter whose first value is `value`.
    pub fn starting_at(value: u64) -> Self {
        Self { value }
    }

    /// Returns current counter value.
    pub fn curr(&self) -> u64 {
        self.value
    }

    /// Post-increments the counter.
    pub fn increment(&mut self) -> u64 {
        let curr = self.value;
        self.value += 1;
        curr
    }
}

/// Parses `key=value` pairs separated by commas, ignoring malformed items.
pub fn parse_options(s: &str) -> Vec<(String, String)> {
    let mut ans = Vec::new();
    for t in s.split(',') {
        if let Some((l, r)) = t.split_once('=') {
            ans.push((l.trim().to_string(), r.trim().to_string()));
        }
    }
    ans
}

/// If `s` looks like `Name[options]`, returns the options string.
pub fn strip_bracketed<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?.strip_prefix('[')?.strip_suffix(']')
}
