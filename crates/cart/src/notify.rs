//! User-facing notifications.

use std::sync::Arc;

/// Fire-and-forget sink for user-facing error messages (a toast, a status
/// line). Delivery is not confirmed.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

impl<T: Notifier> Notifier for Arc<T> {
    fn error(&self, message: &str) {
        (**self).error(message);
    }
}

/// Notifier that surfaces messages through `tracing`.
///
/// Logs at `info`; the store reports the underlying failure itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::info!(notification = message, "{message}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use tracing::Level;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Clone, Default)]
    struct LevelRecorder(Arc<Mutex<Vec<Level>>>);

    impl<S: tracing::Subscriber> Layer<S> for LevelRecorder {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn test_tracing_notifier_logs_below_warn() {
        let recorder = LevelRecorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());

        tracing::subscriber::with_default(subscriber, || {
            TracingNotifier.error("Requested quantity is out of stock");
        });

        assert_eq!(*recorder.0.lock().unwrap(), vec![Level::INFO]);
    }
}
