//! The error-logger collaborator the Assembler reports through.

/// Sink for Assembler diagnostics.
pub trait ErrorLogger {
    fn report_error(&mut self, text: &str);
    fn report_warning(&mut self, text: &str);
    fn num_errs(&self) -> usize;
    fn num_warnings(&self) -> usize;
}

/// Default logger: keeps every message and forwards it to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl ErrorLogger for DiagnosticLog {
    fn report_error(&mut self, text: &str) {
        tracing::error!(target: "ct_compiler::assembler", "{text}");
        self.errors.push(text.to_string());
    }

    fn report_warning(&mut self, text: &str) {
        tracing::warn!(target: "ct_compiler::assembler", "{text}");
        self.warnings.push(text.to_string());
    }

    fn num_errs(&self) -> usize {
        self.errors.len()
    }

    fn num_warnings(&self) -> usize {
        self.warnings.len()
    }
}

impl<L: ErrorLogger + ?Sized> ErrorLogger for Box<L> {
    fn report_error(&mut self, text: &str) {
        (**self).report_error(text)
    }

    fn report_warning(&mut self, text: &str) {
        (**self).report_warning(text)
    }

    fn num_errs(&self) -> usize {
        (**self).num_errs()
    }

    fn num_warnings(&self) -> usize {
        (**self).num_warnings()
    }
}
