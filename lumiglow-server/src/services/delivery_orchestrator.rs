//! Concurrent delivery of one envelope to the device and both stores.
//!
//! Device delivery decides the reported outcome. Persistence is best effort
//! and only logged, unless a write is still running at the deadline.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use lumiglow_api::models::DeviceCommandSet;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};

use crate::errors::{PushError, StoreError};
use crate::services::{
    CommandResolver, ConnectionRegistry, DeliveryEnvelope, DevicePush, ObjectStore, TableStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutTask {
    Device,
    ObjectStore,
    TableStore,
}

impl fmt::Display for FanOutTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanOutTask::Device => f.write_str("device"),
            FanOutTask::ObjectStore => f.write_str("object store"),
            FanOutTask::TableStore => f.write_str("table store"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// No live channel for the identity; the device is most likely offline.
    DeviceUnreachable,
    DeliveryFailed { reason: String },
    /// Tasks cut off by the deadline.
    PartialTimeout { pending: Vec<FanOutTask> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcome: DeliveryOutcome,
    pub object_stored: bool,
    pub record_stored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeviceResult {
    Delivered,
    NoChannel,
    Failed(String),
}

#[derive(Debug)]
enum Settled<T> {
    Done(T),
    Panicked(String),
    TimedOut,
}

#[derive(Clone)]
pub struct DeliveryOrchestrator {
    resolver: CommandResolver,
    device_type: String,
    registry: Arc<dyn ConnectionRegistry>,
    push: Arc<dyn DevicePush>,
    objects: Arc<dyn ObjectStore>,
    table: Arc<dyn TableStore>,
}

impl DeliveryOrchestrator {
    pub fn new(
        resolver: CommandResolver,
        device_type: impl Into<String>,
        registry: Arc<dyn ConnectionRegistry>,
        push: Arc<dyn DevicePush>,
        objects: Arc<dyn ObjectStore>,
        table: Arc<dyn TableStore>,
    ) -> Self {
        Self {
            resolver,
            device_type: device_type.into(),
            registry,
            push,
            objects,
            table,
        }
    }

    /// Runs the three sinks concurrently and waits at most `deadline`.
    /// Anything still running then is aborted.
    pub async fn deliver(&self, envelope: Arc<DeliveryEnvelope>, deadline: Duration) -> DeliveryReport {
        let cutoff = Instant::now() + deadline;

        let device = tokio::spawn(deliver_to_device(
            self.resolver.clone(),
            self.device_type.clone(),
            self.registry.clone(),
            self.push.clone(),
            envelope.clone(),
        ));
        let object = tokio::spawn(write_object(self.objects.clone(), envelope.clone()));
        let record = tokio::spawn(write_record(self.table.clone(), envelope.clone()));

        let (device, object, record) = tokio::join!(
            settle(device, cutoff),
            settle(object, cutoff),
            settle(record, cutoff)
        );

        let mut pending = Vec::new();
        let object_stored = persisted(FanOutTask::ObjectStore, object, &mut pending, &envelope);
        let record_stored = persisted(FanOutTask::TableStore, record, &mut pending, &envelope);

        let device = match device {
            Settled::Done(result) => result,
            Settled::Panicked(reason) => DeviceResult::Failed(reason),
            Settled::TimedOut => {
                pending.insert(0, FanOutTask::Device);
                DeviceResult::Failed(String::from("timed out"))
            }
        };

        let outcome = if !pending.is_empty() {
            tracing::warn!(
                request_id = %envelope.request_id,
                ?pending,
                "fan-out deadline of {:?} reached",
                deadline
            );
            DeliveryOutcome::PartialTimeout { pending }
        } else {
            match device {
                DeviceResult::Delivered => DeliveryOutcome::Delivered,
                DeviceResult::NoChannel => DeliveryOutcome::DeviceUnreachable,
                DeviceResult::Failed(reason) => DeliveryOutcome::DeliveryFailed { reason },
            }
        };

        DeliveryReport {
            outcome,
            object_stored,
            record_stored,
        }
    }
}

async fn settle<T>(mut handle: JoinHandle<T>, cutoff: Instant) -> Settled<T> {
    match timeout_at(cutoff, &mut handle).await {
        Ok(Ok(value)) => Settled::Done(value),
        Ok(Err(e)) => Settled::Panicked(e.to_string()),
        Err(_) => {
            handle.abort();
            Settled::TimedOut
        }
    }
}

fn persisted(
    task: FanOutTask,
    settled: Settled<Result<(), StoreError>>,
    pending: &mut Vec<FanOutTask>,
    envelope: &DeliveryEnvelope,
) -> bool {
    match settled {
        Settled::Done(Ok(())) => true,
        Settled::Done(Err(e)) => {
            tracing::error!(request_id = %envelope.request_id, "{} write failed: {}", task, e);
            false
        }
        Settled::Panicked(reason) => {
            tracing::error!(request_id = %envelope.request_id, "{} task panicked: {}", task, reason);
            false
        }
        Settled::TimedOut => {
            pending.push(task);
            false
        }
    }
}

async fn deliver_to_device(
    resolver: CommandResolver,
    device_type: String,
    registry: Arc<dyn ConnectionRegistry>,
    push: Arc<dyn DevicePush>,
    envelope: Arc<DeliveryEnvelope>,
) -> DeviceResult {
    let identity = envelope.identity.as_str();

    let resolve = async {
        match &envelope.command_set {
            Some(commands) => commands.clone(),
            None => resolver.resolve(&envelope.descriptor, &device_type).await,
        }
    };
    let (commands, channel) = tokio::join!(resolve, registry.get_channel(identity));

    let channel = match channel {
        Ok(Some(channel)) => channel,
        Ok(None) => {
            tracing::warn!(identity, "no live connection, skipping device delivery");
            return DeviceResult::NoChannel;
        }
        Err(e) => {
            tracing::error!(identity, "connection lookup failed: {}", e);
            return DeviceResult::NoChannel;
        }
    };

    match push_commands(push.as_ref(), &channel, &commands).await {
        Ok(()) => {
            tracing::info!(identity, channel = %channel, "command set delivered");
            DeviceResult::Delivered
        }
        Err(PushError::UnknownChannel(_)) => {
            tracing::warn!(identity, channel = %channel, "registered connection is gone");
            DeviceResult::NoChannel
        }
        Err(e) => {
            tracing::error!(identity, channel = %channel, "device delivery failed: {}", e);
            DeviceResult::Failed(e.to_string())
        }
    }
}

async fn push_commands(
    push: &dyn DevicePush,
    channel: &str,
    commands: &DeviceCommandSet,
) -> Result<(), PushError> {
    let bytes = serde_json::to_vec(commands).map_err(|e| PushError::Rejected(e.to_string()))?;
    push.send(channel, bytes).await
}

async fn write_object(
    objects: Arc<dyn ObjectStore>,
    envelope: Arc<DeliveryEnvelope>,
) -> Result<(), StoreError> {
    objects
        .put(&envelope.object_key(), envelope.object_body())
        .await
}

async fn write_record(
    table: Arc<dyn TableStore>,
    envelope: Arc<DeliveryEnvelope>,
) -> Result<(), StoreError> {
    table
        .put(
            &envelope.partition_key(),
            &envelope.timestamp.sort_key(),
            envelope.record_attributes()?,
        )
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serde_json::Value;

    use crate::services::tests::*;

    use super::*;

    #[tokio::test]
    async fn test_delivered_and_persisted() {
        let stubs = Stubs::new(Some("c1"), PushMode::Ack);
        let orchestrator = stubs.orchestrator();
        let envelope = envelope("u1", "r1", None);

        let report = orchestrator
            .deliver(envelope.clone(), Duration::from_secs(5))
            .await;

        assert_eq!(report.outcome, DeliveryOutcome::Delivered);
        assert!(report.object_stored);
        assert!(report.record_stored);

        let sent = stubs.push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "c1");
        let commands: Value = serde_json::from_slice(&sent[0].1).unwrap();
        assert_eq!(commands["rgbCode"], serde_json::json!([255, 0, 0]));
        assert_eq!(commands["rup"], "code-12");
        assert_eq!(commands["dynamicIr"], "");

        assert_eq!(
            stubs.objects.get("responses/u1/r1.json").unwrap(),
            VALID_DESCRIPTOR.as_bytes()
        );
        let records = stubs.table.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "uuid#u1");
        assert_eq!(records[0].1, "DAY#0#TIME#14:30:00");
        assert_eq!(records[0].2.emotion_tag, "Positive");
    }

    #[tokio::test]
    async fn test_never_resolving_push_times_out() {
        let stubs = Stubs::new(Some("c1"), PushMode::Hang);
        let orchestrator = stubs.orchestrator();
        let deadline = Duration::from_millis(100);

        let started = std::time::Instant::now();
        let report = orchestrator.deliver(envelope("u1", "r1", None), deadline).await;

        assert!(started.elapsed() < deadline + Duration::from_secs(1));
        assert_eq!(
            report.outcome,
            DeliveryOutcome::PartialTimeout {
                pending: vec![FanOutTask::Device]
            }
        );
        assert!(report.object_stored);
        assert!(report.record_stored);
    }

    #[tokio::test]
    async fn test_missing_channel_is_unreachable_and_still_persisted() {
        let stubs = Stubs::new(None, PushMode::Ack);
        let orchestrator = stubs.orchestrator();

        let report = orchestrator
            .deliver(envelope("u1", "r1", None), Duration::from_secs(5))
            .await;

        assert_eq!(report.outcome, DeliveryOutcome::DeviceUnreachable);
        assert!(report.object_stored);
        assert!(report.record_stored);
        assert!(stubs.push.sent().is_empty());
        assert_eq!(stubs.table.records().len(), 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_fail_delivery() {
        let stubs = Stubs::new(Some("c1"), PushMode::Ack);
        stubs.objects.fail.store(true, Ordering::SeqCst);
        let orchestrator = stubs.orchestrator();

        let report = orchestrator
            .deliver(envelope("u1", "r1", None), Duration::from_secs(5))
            .await;

        assert_eq!(report.outcome, DeliveryOutcome::Delivered);
        assert!(!report.object_stored);
        assert!(report.record_stored);
    }

    #[tokio::test]
    async fn test_rejected_push_is_delivery_failure() {
        let stubs = Stubs::new(Some("c1"), PushMode::Reject);
        let orchestrator = stubs.orchestrator();

        let report = orchestrator
            .deliver(envelope("u1", "r1", None), Duration::from_secs(5))
            .await;

        assert!(matches!(report.outcome, DeliveryOutcome::DeliveryFailed { .. }));
        assert!(report.record_stored);
    }

    #[tokio::test]
    async fn test_redelivery_overwrites_persisted_copies() {
        let stubs = Stubs::new(Some("c1"), PushMode::Ack);
        let orchestrator = stubs.orchestrator();
        let envelope = envelope("u1", "r1", None);

        orchestrator.deliver(envelope.clone(), Duration::from_secs(5)).await;
        orchestrator.deliver(envelope, Duration::from_secs(5)).await;

        assert_eq!(stubs.table.records().len(), 1);
        assert_eq!(stubs.objects.len(), 1);
        assert_eq!(stubs.push.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_resolved_command_set_is_sent_as_is() {
        let stubs = Stubs::new(Some("c1"), PushMode::Ack);
        let orchestrator = stubs.orchestrator();
        let commands = DeviceCommandSet::empty([7, 8, 9]);

        orchestrator
            .deliver(envelope("u1", "r1", Some(commands.clone())), Duration::from_secs(5))
            .await;

        let sent = stubs.push.sent();
        let delivered: DeviceCommandSet = serde_json::from_slice(&sent[0].1).unwrap();
        assert_eq!(delivered, commands);
        assert_eq!(stubs.lookup.calls.load(Ordering::SeqCst), 0);
    }
}
