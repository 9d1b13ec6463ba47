use crate::error::ModelError;

/// Incremental JSON text builder driven by the generator's traversal.
///
/// The writer tracks separators only; it does not check nesting, so a traversal bug shows up
/// as text that fails to parse.
#[derive(Debug, Default)]
pub struct JsonWriter {
    out: String,
    /// One entry per open container: whether nothing has been written into it yet.
    first: Vec<bool>,
    after_key: bool,
}

impl JsonWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn separator(&mut self) {
        if self.after_key {
            self.after_key = false;
            return;
        }
        if let Some(first) = self.first.last_mut() {
            if *first {
                *first = false;
            } else {
                self.out.push(',');
            }
        }
    }

    pub fn open_object(&mut self) {
        self.separator();
        self.out.push('{');
        self.first.push(true);
    }

    pub fn close_object(&mut self) {
        self.out.push('}');
        self.first.pop();
    }

    pub fn open_array(&mut self) {
        self.separator();
        self.out.push('[');
        self.first.push(true);
    }

    pub fn close_array(&mut self) {
        self.out.push(']');
        self.first.pop();
    }

    /// # Errors
    /// Fails only if the key cannot be escaped.
    pub fn write_key(&mut self, key: &str) -> Result<(), ModelError> {
        self.separator();
        self.out.push_str(&serde_json::to_string(key)?);
        self.out.push(':');
        self.after_key = true;
        Ok(())
    }

    /// Writes a quoted, escaped string.
    ///
    /// # Errors
    /// Fails only if the value cannot be escaped.
    pub fn write_string(&mut self, value: &str) -> Result<(), ModelError> {
        self.separator();
        self.out.push_str(&serde_json::to_string(value)?);
        Ok(())
    }

    /// Writes `text` verbatim (numbers, booleans).
    pub fn write_raw(&mut self, text: &str) {
        self.separator();
        self.out.push_str(text);
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }
}
