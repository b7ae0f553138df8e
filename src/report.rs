//! User-facing progress and failure reporting.
//!
//! Operations that talk to the user take a `&dyn Reporter` instead of deciding
//! for themselves where messages go. The CLI supplies a console reporter,
//! library callers can use [`LogReporter`] or [`NullReporter`].

/// Destination for progress and failure messages.
pub trait Reporter {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards messages to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn info(&self, message: &str) {
        log::info!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn info(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Reporter;
    use std::cell::RefCell;

    /// Records every message, for assertions.
    #[derive(Default)]
    pub struct RecordingReporter {
        pub infos: RefCell<Vec<String>>,
        pub errors: RefCell<Vec<String>>,
    }

    impl Reporter for RecordingReporter {
        fn info(&self, message: &str) {
            self.infos.borrow_mut().push(message.to_string());
        }

        fn error(&self, message: &str) {
            self.errors.borrow_mut().push(message.to_string());
        }
    }
}
