use std::fmt::Write;

use crate::sandbox::prelude::ExecutionResult;

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Results of a run, in script order
#[derive(Default)]
pub struct RunReport {
    results: Vec<ExecutionResult>,
    errors: String,
}

/// The report as delivered and persisted
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedReport {
    /// names of executed scripts, in order
    pub scripts: Vec<String>,
    pub document: String,
    /// `None` if no script wrote to stderr
    pub errors: Option<String>,
    pub timed_out: Vec<bool>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, result: ExecutionResult) {
        self.errors.push_str(&String::from_utf8_lossy(&result.stderr));
        self.results.push(result);
    }
    pub fn finish(self) -> FinishedReport {
        let mut document = String::from("<testrun>");
        for result in &self.results {
            // writing to String never fails
            write!(
                document,
                "\n<test_script>\n  <file_name>{}</file_name>\n  <time>{}</time>\n  {}\n</test_script>",
                escape(&result.script.name),
                result.duration.as_millis(),
                String::from_utf8_lossy(&result.stdout)
            )
            .ok();
        }
        document.push_str("\n</testrun>");

        let errors = self.errors.trim();
        FinishedReport {
            scripts: self.results.iter().map(|x| x.script.name.clone()).collect(),
            timed_out: self.results.iter().map(|x| x.timed_out).collect(),
            document,
            errors: (!errors.is_empty()).then(|| errors.to_owned()),
        }
    }
}
