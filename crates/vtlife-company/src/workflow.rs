//! Company workflow: the once-per-day batch.
//!
//! ## Flow
//! ```text
//! company inbox ── drain ──▶ project        → review → project_review mail
//!                                             approved → queue + persist
//!                            advertisement  → normalized → advertisement mail
//!                            other/malformed → logged
//!                 ── ack every handled entry
//! queue front ── skip gate ──▶ shoot window → shoot_schedule mail
//!                                            → dequeue + persist
//! ```
//! Outbound mail goes to the performer inbox and is stamped with virtual time.

use chrono::NaiveDateTime;
use serde_json::{Value, json};
use vtlife_core::Result;
use vtlife_core::timefmt::MINUTE_FORMAT;
use vtlife_mailbox::{Envelope, MailType, MailboxChannel, MessageStore};

use crate::gate::SkipDecider;
use crate::project::{ProjectInfo, lookup_str};
use crate::queue::{ApprovedQueue, ApprovedStore};
use crate::review::ReviewPolicy;
use crate::window::{ShootWindow, WindowDefaults};

pub const DEFAULT_SHOOT_DESCRIPTION: &str =
    "The company has scheduled a shoot; please prepare the related material.";

/// A shoot emitted by the scheduling step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledShoot {
    pub project_id: String,
    pub project_name: String,
    pub window: ShootWindow,
}

/// What one batch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Inbound entries deleted from the inbox, malformed ones included.
    pub consumed: usize,
    pub approved: usize,
    pub rejected: usize,
    pub advertisements: usize,
    pub ignored: usize,
    pub malformed: usize,
    /// Entries left in the inbox because handling failed.
    pub deferred: usize,
    pub skipped_scheduling: bool,
    pub scheduled: Option<ScheduledShoot>,
}

/// Company agent state: two mailboxes, the approved queue and its policies.
pub struct CompanyWorkflow<S: MessageStore> {
    inbox: MailboxChannel<S>,
    outbox: MailboxChannel<S>,
    queue: ApprovedQueue,
    store: Option<ApprovedStore>,
    policy: Box<dyn ReviewPolicy>,
    skip: Box<dyn SkipDecider>,
    window: WindowDefaults,
}

impl<S: MessageStore> CompanyWorkflow<S> {
    /// `inbox` is read by the company; `outbox` is the performer's inbox.
    pub fn new(
        inbox: MailboxChannel<S>,
        outbox: MailboxChannel<S>,
        policy: Box<dyn ReviewPolicy>,
        skip: Box<dyn SkipDecider>,
    ) -> Self {
        Self {
            inbox,
            outbox,
            queue: ApprovedQueue::new(),
            store: None,
            policy,
            skip,
            window: WindowDefaults::default(),
        }
    }

    /// Back the queue with a file, loading whatever it already holds.
    pub fn with_store(mut self, store: ApprovedStore) -> Self {
        self.queue = store.load();
        self.store = Some(store);
        self
    }

    pub fn with_window_defaults(mut self, window: WindowDefaults) -> Self {
        self.window = window;
        self
    }

    pub fn queue(&self) -> &ApprovedQueue {
        &self.queue
    }

    pub fn inbox(&self) -> &MailboxChannel<S> {
        &self.inbox
    }

    pub fn outbox(&self) -> &MailboxChannel<S> {
        &self.outbox
    }

    /// Process the whole inbox, then run the scheduling step.
    pub fn daily_batch(&mut self, now: NaiveDateTime) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        let drained = self.inbox.drain()?;
        tracing::info!(
            "🏢 Daily batch at {now}: {} messages, {} queued projects",
            drained.len(),
            self.queue.len()
        );

        for envelope in &drained.messages {
            if let Err(e) = self.handle(envelope, now, &mut report) {
                tracing::warn!("⚠️ Keeping {} for the next batch: {e}", envelope.id);
                report.deferred += 1;
                continue;
            }
            self.consume(&envelope.id, &mut report);
        }
        for id in &drained.malformed {
            report.malformed += 1;
            self.consume(id, &mut report);
        }

        self.schedule_step(now, &mut report);
        tracing::info!(
            "🏢 Batch done: {} approved, {} rejected, {} ads, shoot {}",
            report.approved,
            report.rejected,
            report.advertisements,
            if report.scheduled.is_some() { "scheduled" } else { "none" }
        );
        Ok(report)
    }

    fn consume(&self, id: &vtlife_mailbox::MessageId, report: &mut BatchReport) {
        match self.inbox.ack(id) {
            Ok(()) => report.consumed += 1,
            Err(e) => tracing::warn!("⚠️ Failed to delete {id}: {e}"),
        }
    }

    fn handle(&mut self, envelope: &Envelope, now: NaiveDateTime, report: &mut BatchReport) -> Result<()> {
        match &envelope.mail.kind {
            MailType::Project => self.handle_project(envelope, now, report),
            MailType::Advertisement => {
                self.forward_advertisement(&envelope.mail.payload_value(), now)?;
                report.advertisements += 1;
                Ok(())
            }
            other => {
                tracing::info!("📭 Ignoring '{other}' message {}", envelope.id);
                report.ignored += 1;
                Ok(())
            }
        }
    }

    fn handle_project(&mut self, envelope: &Envelope, now: NaiveDateTime, report: &mut BatchReport) -> Result<()> {
        let payload = envelope.mail.payload_value();
        let info = ProjectInfo::from_mail(&payload);
        let project_id = match info.id.clone() {
            Some(id) => id,
            None => {
                // Derived from the message id so a redelivered mail maps to the same entry.
                let uuid = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, envelope.id.0.as_bytes());
                let id = format!("project-{uuid}");
                tracing::warn!("⚠️ Project '{}' has no id, assigned {id}", info.name);
                id
            }
        };

        let decision = self.policy.review(&payload);
        let subject = if decision.approved {
            format!("[Project approved] {}", info.name)
        } else {
            format!("[Project rejected] {}", info.name)
        };
        self.outbox.send_at(
            &subject,
            MailType::ProjectReview,
            json!({
                "project_id": project_id,
                "result": if decision.approved { "approved" } else { "not approved" },
                "reason": decision.reason,
            }),
            now,
        )?;

        if decision.approved {
            tracing::info!("✅ Project approved: {project_id} ({})", self.policy.name());
            self.queue.insert(&project_id, payload);
            self.persist();
            report.approved += 1;
        } else {
            tracing::info!("❌ Project rejected: {project_id}: {}", decision.reason);
            report.rejected += 1;
        }
        Ok(())
    }

    fn forward_advertisement(&self, payload: &Value, now: NaiveDateTime) -> Result<()> {
        let pick = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| payload.get(*key).filter(|v| !v.is_null()).cloned())
                .unwrap_or_else(|| Value::String(String::new()))
        };
        let title = lookup_str(payload, &["ad_title", "title"]).unwrap_or_default();
        tracing::info!("📢 Forwarding advertisement '{title}'");
        self.outbox.send_at(
            &format!("[Advertisement] {title}"),
            MailType::Advertisement,
            json!({
                "title": title,
                "brand": pick(&["brand"]),
                "suggested_duration": pick(&["duration", "suggested_duration"]),
                "requirement": pick(&["requirement", "requirements"]),
                "content": pick(&["content"]),
            }),
            now,
        )?;
        Ok(())
    }

    fn schedule_step(&mut self, now: NaiveDateTime, report: &mut BatchReport) {
        if self.queue.is_empty() {
            tracing::debug!("No approved projects, nothing to schedule");
            return;
        }
        if self.skip.should_skip() {
            tracing::info!("🎲 Skipping shoot scheduling this cycle");
            report.skipped_scheduling = true;
            return;
        }
        let Some(front) = self.queue.front().cloned() else {
            return;
        };

        let info = front.info();
        let window = ShootWindow::resolve(
            info.preferred_start.as_deref(),
            info.preferred_end.as_deref(),
            now,
            self.window,
        );
        let project_id = info.id.clone().unwrap_or_else(|| front.id.clone());
        let description = if info.description.trim().is_empty() {
            DEFAULT_SHOOT_DESCRIPTION.to_string()
        } else {
            info.description.clone()
        };

        let sent = self.outbox.send_at(
            &format!("[Shoot scheduled] {}", info.name),
            MailType::ShootSchedule,
            json!({
                "project_id": project_id,
                "project_name": info.name,
                "start_time": window.start.format(MINUTE_FORMAT).to_string(),
                "end_time": window.end.format(MINUTE_FORMAT).to_string(),
                "description": description,
            }),
            now,
        );
        if let Err(e) = sent {
            tracing::warn!("⚠️ Failed to send shoot schedule for {project_id}, keeping it queued: {e}");
            return;
        }
        tracing::info!(
            "🎬 Shoot scheduled: {} ({} to {})",
            info.name,
            window.start.format(MINUTE_FORMAT),
            window.end.format(MINUTE_FORMAT)
        );

        if self.queue.remove_by_id(&front.id).is_none() {
            // Two queued projects sharing a name makes this ambiguous.
            tracing::warn!("⚠️ {} not found by id, removing by name '{}'", front.id, info.name);
            if self.queue.remove_by_name(&info.name).is_none() {
                tracing::warn!("⚠️ Scheduled project '{}' was not in the queue", info.name);
            }
        }
        self.persist();

        report.scheduled = Some(ScheduledShoot {
            project_id,
            project_name: info.name,
            window,
        });
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            match store.save(&self.queue) {
                Ok(()) => tracing::debug!("💾 Approved projects saved ({})", self.queue.len()),
                Err(e) => tracing::warn!("⚠️ Failed to save approved projects: {e}"),
            }
        }
    }
}
