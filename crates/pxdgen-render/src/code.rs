//! Line-oriented code writer.

/// One level of indentation.
pub const INDENT: &str = "    ";

/// Accumulates output lines at the current indentation level.
#[derive(Debug, Default)]
pub struct CodeWriter {
    lines: Vec<String>,
    level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line. Empty lines are never indented.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{text}", INDENT.repeat(self.level)));
        }
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Run `f` one indentation level deeper.
    pub fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.level += 1;
        f(self);
        self.level -= 1;
    }

    /// Write blocks separated by a single blank line.
    pub fn blocks<B: AsRef<[String]>>(&mut self, blocks: &[B]) {
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                self.blank();
            }
            for line in block.as_ref() {
                self.line(line);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
