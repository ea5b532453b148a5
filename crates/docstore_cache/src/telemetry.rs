// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured logging of cache operations.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Provision,
    Fetch,
    Contains,
    Save,
    Delete,
    Flush,
    Stats,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provision => "cache.provision",
            Self::Fetch => "cache.fetch",
            Self::Contains => "cache.contains",
            Self::Save => "cache.save",
            Self::Delete => "cache.delete",
            Self::Flush => "cache.flush",
            Self::Stats => "cache.stats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Inserted,
    Updated,
    Deleted,
    Ok,
    Error,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Inserted => "cache.inserted",
            Self::Updated => "cache.updated",
            Self::Deleted => "cache.deleted",
            Self::Ok => "cache.ok",
            Self::Error => "cache.error",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss | Self::Ok => Severity::Debug,
            Self::Inserted | Self::Updated | Self::Deleted => Severity::Info,
            Self::Error => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Debug,
    Info,
    Error,
}

/// Emits one `cache.event` per cache operation when enabled.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CacheTelemetry {
    logging_enabled: bool,
}

impl CacheTelemetry {
    pub fn new(logging_enabled: bool) -> Self {
        Self { logging_enabled }
    }

    #[inline]
    pub fn record(self, cache_name: &str, operation: CacheOperation, activity: CacheActivity) {
        if self.logging_enabled {
            Self::emit(cache_name, operation, activity, None);
        }
    }

    #[inline]
    pub fn record_error(self, cache_name: &str, operation: CacheOperation, error: &dyn std::error::Error) {
        if self.logging_enabled {
            Self::emit(cache_name, operation, CacheActivity::Error, Some(error));
        }
    }

    fn emit(cache_name: &str, operation: CacheOperation, activity: CacheActivity, error: Option<&dyn std::error::Error>) {
        let op = operation.as_str();
        let ev = activity.as_str();
        let error = error.map(ToString::to_string);

        // Tracing level must be constant, so we use a macro to select the appropriate level.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.name = cache_name,
                    cache.operation = op,
                    cache.activity = ev,
                    cache.error = error.as_deref(),
                    "cache.event"
                )
            };
        }

        match activity.severity() {
            Severity::Error => emit_event!(error),
            Severity::Info => emit_event!(info),
            Severity::Debug => emit_event!(debug),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    /// Collects formatted log output for assertions.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl LogCapture {
        pub fn output(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }

        /// A plain-text subscriber writing into this capture; install with `set_default()`.
        pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
            let capture = self.clone();
            tracing_subscriber::registry().with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(move || capture.clone()),
            )
        }
    }

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::LogCapture;
    use super::*;

    #[test]
    fn operation_names() {
        assert_eq!(CacheOperation::Fetch.as_str(), "cache.fetch");
        assert_eq!(CacheOperation::Save.as_str(), "cache.save");
        assert_eq!(CacheOperation::Flush.as_str(), "cache.flush");
    }

    #[test]
    fn emit_contains_all_fields_and_values() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        CacheTelemetry::new(true).record("app-cache", CacheOperation::Save, CacheActivity::Inserted);

        assert!(capture.output().contains("cache.event"));
        assert!(capture.output().contains("app-cache"));
        assert!(capture.output().contains(CacheOperation::Save.as_str()));
        assert!(capture.output().contains(CacheActivity::Inserted.as_str()));
        assert!(capture.output().contains("INFO"));
    }

    #[test]
    fn errors_are_logged_with_message() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let error = std::io::Error::other("shard unavailable");
        CacheTelemetry::new(true).record_error("app-cache", CacheOperation::Fetch, &error);

        assert!(capture.output().contains("ERROR"));
        assert!(capture.output().contains("shard unavailable"));
    }

    #[test]
    fn hits_log_at_debug() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        CacheTelemetry::new(true).record("app-cache", CacheOperation::Fetch, CacheActivity::Hit);

        assert!(capture.output().contains("DEBUG"));
    }

    #[test]
    fn disabled_telemetry_emits_nothing() {
        let capture = LogCapture::default();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let telemetry = CacheTelemetry::new(false);
        telemetry.record("app-cache", CacheOperation::Fetch, CacheActivity::Hit);
        telemetry.record_error("app-cache", CacheOperation::Fetch, &std::io::Error::other("boom"));

        assert!(capture.output().is_empty());
    }
}
