//! Fan-out of announcements to the configured recipients.

use std::ops::AddAssign;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use super::ports::{DirectMessenger, RecipientId};

/// Count of delivery attempts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Deliveries the service accepted.
    pub delivered: usize,
    /// Deliveries that failed and were skipped.
    pub failed: usize,
}

impl AddAssign for DeliveryReport {
    fn add_assign(&mut self, other: Self) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Sends each announcement to every recipient independently.
pub struct Notifier {
    messenger: Arc<dyn DirectMessenger>,
    recipients: Vec<RecipientId>,
}

impl Notifier {
    /// Build a notifier for an ordered recipient list.
    #[must_use]
    pub const fn new(messenger: Arc<dyn DirectMessenger>, recipients: Vec<RecipientId>) -> Self {
        Self {
            messenger,
            recipients,
        }
    }

    /// Configured recipients.
    #[must_use]
    pub fn recipients(&self) -> &[RecipientId] {
        &self.recipients
    }

    /// Deliver `message` to every recipient.
    ///
    /// Deliveries run concurrently and this returns only after all of them
    /// have settled. A failed delivery is logged and does not affect the
    /// others.
    pub async fn notify(&self, message: &str) -> DeliveryReport {
        if self.recipients.is_empty() {
            debug!(notification = message, "no recipients configured; dropping notification");
            return DeliveryReport::default();
        }

        let deliveries = self.recipients.iter().map(|recipient| async move {
            match self.messenger.send_message(recipient, message).await {
                Ok(()) => true,
                Err(error) => {
                    warn!(
                        recipient = %recipient,
                        notification = message,
                        error = %error,
                        "unable to deliver notification"
                    );
                    false
                }
            }
        });
        let outcomes = join_all(deliveries).await;

        let delivered = outcomes.iter().filter(|delivered| **delivered).count();
        DeliveryReport {
            delivered,
            failed: outcomes.len() - delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{DirectMessageError, MockDirectMessenger};

    #[derive(Default)]
    struct RecordingMessenger {
        failing: Vec<RecipientId>,
        attempts: Mutex<Vec<(RecipientId, String)>>,
    }

    #[async_trait]
    impl DirectMessenger for RecordingMessenger {
        async fn send_message(
            &self,
            recipient: &RecipientId,
            message: &str,
        ) -> Result<(), DirectMessageError> {
            self.attempts
                .lock()
                .expect("attempts mutex")
                .push((recipient.clone(), message.to_owned()));
            if self.failing.contains(recipient) {
                return Err(DirectMessageError::transport("connection refused"));
            }
            Ok(())
        }
    }

    #[fixture]
    fn recipients() -> Vec<RecipientId> {
        ["alice@example.com", "@bob", "31337"]
            .into_iter()
            .map(RecipientId::new)
            .collect()
    }

    #[rstest]
    #[tokio::test]
    async fn delivers_to_every_recipient(recipients: Vec<RecipientId>) {
        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Notifier::new(messenger.clone(), recipients.clone());

        let report = notifier.notify("Say hello to @bob (Bob B)").await;

        assert_eq!(
            report,
            DeliveryReport {
                delivered: 3,
                failed: 0
            }
        );
        let attempts = messenger.attempts.lock().expect("attempts mutex");
        let reached: Vec<&RecipientId> = attempts.iter().map(|(r, _)| r).collect();
        for recipient in &recipients {
            assert!(reached.contains(&recipient));
        }
        assert!(
            attempts
                .iter()
                .all(|(_, message)| message == "Say hello to @bob (Bob B)")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn failed_recipient_does_not_block_later_recipients(recipients: Vec<RecipientId>) {
        let messenger = Arc::new(RecordingMessenger {
            failing: vec![RecipientId::new("alice@example.com")],
            ..RecordingMessenger::default()
        });
        let notifier = Notifier::new(messenger.clone(), recipients);

        let report = notifier.notify("Goodbye to @carol (Carol C)").await;

        assert_eq!(
            report,
            DeliveryReport {
                delivered: 2,
                failed: 1
            }
        );
        let attempts = messenger.attempts.lock().expect("attempts mutex");
        assert_eq!(attempts.len(), 3);
        assert!(
            attempts
                .iter()
                .any(|(recipient, _)| recipient.as_str() == "31337")
        );
    }

    #[tokio::test]
    async fn every_recipient_failing_is_not_fatal() {
        let mut messenger = MockDirectMessenger::new();
        messenger
            .expect_send_message()
            .times(2)
            .returning(|_, _| Err(DirectMessageError::unauthorized("bad token")));
        let notifier = Notifier::new(
            Arc::new(messenger),
            vec![RecipientId::new("1"), RecipientId::new("2")],
        );

        let report = notifier.notify("Goodbye to @x (X)").await;

        assert_eq!(
            report,
            DeliveryReport {
                delivered: 0,
                failed: 2
            }
        );
    }

    #[tokio::test]
    async fn empty_recipient_list_sends_nothing() {
        let mut messenger = MockDirectMessenger::new();
        messenger.expect_send_message().never();
        let notifier = Notifier::new(Arc::new(messenger), Vec::new());

        assert_eq!(notifier.notify("anything").await, DeliveryReport::default());
    }

    #[test]
    fn reports_accumulate() {
        let mut total = DeliveryReport {
            delivered: 1,
            failed: 2,
        };
        total += DeliveryReport {
            delivered: 3,
            failed: 0,
        };

        assert_eq!(
            total,
            DeliveryReport {
                delivered: 4,
                failed: 2
            }
        );
    }
}
