//! Reporter trait for dependency injection
//!
//! Lets the installation pipeline report progress without being coupled to a
//! particular terminal renderer.

/// Progress sink for resolution and installation.
pub trait Reporter: Send + Sync {
    /// Resolution of an app has started.
    fn resolving(&self, app_id: &str);

    /// Download progress. `total` is `None` when the server sent no length.
    fn downloading(&self, app_id: &str, version: &str, current: u64, total: Option<u64>);

    /// The downloaded body matched its published hash.
    fn verified(&self, app_id: &str, version: &str);

    /// The stable symlink now points at the new version.
    fn linked(&self, binary: &str, version: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn resolving(&self, app_id: &str) {
        (**self).resolving(app_id);
    }
    fn downloading(&self, app_id: &str, version: &str, current: u64, total: Option<u64>) {
        (**self).downloading(app_id, version, current, total);
    }
    fn verified(&self, app_id: &str, version: &str) {
        (**self).verified(app_id, version);
    }
    fn linked(&self, binary: &str, version: &str) {
        (**self).linked(binary, version);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
}

/// A no-op reporter for silent operations (e.g., scripting, testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn resolving(&self, _: &str) {}
    fn downloading(&self, _: &str, _: &str, _: u64, _: Option<u64>) {}
    fn verified(&self, _: &str, _: &str) {}
    fn linked(&self, _: &str, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}
