/// An indentation-aware line buffer used by the backends.
///
/// Comment lines are tracked separately from statement lines so a backend can
/// tell whether a suite would end up syntactically empty.
pub struct CodeWriter {
    buffer: String,
    depth: usize,
    unit: &'static str,
    statements: usize,
}

impl CodeWriter {
    pub fn new(unit: &'static str) -> Self {
        Self {
            buffer: String::new(),
            depth: 0,
            unit,
            statements: 0,
        }
    }

    /// Writes a statement line at the current depth.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.statements += 1;
        self.push(text.as_ref());
    }

    /// Writes a line that does not count as a statement.
    pub fn comment(&mut self, text: impl AsRef<str>) {
        self.push(text.as_ref());
    }

    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Number of statement lines written so far.
    pub fn statements(&self) -> usize {
        self.statements
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    fn push(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str(self.unit);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::CodeWriter;

    #[test]
    fn indents_and_counts_statements() {
        let mut out = CodeWriter::new("    ");
        out.comment("# header");
        out.line("if x:");
        out.indent();
        out.line("pass");
        out.dedent();
        out.dedent();
        out.line("done");
        assert_eq!(out.statements(), 3);
        assert_eq!(out.finish(), "# header\nif x:\n    pass\ndone\n");
    }
}
