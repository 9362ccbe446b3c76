//! Performer agent loop.

use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDateTime;
use vtlife_bridge::{BackgroundTracker, Bridge, PresentationEvent};
use vtlife_core::VtlifeConfig;
use vtlife_core::config::expand_path;
use vtlife_mailbox::{MailType, MailboxChannel, MailboxRole, MessageStore};
use vtlife_scheduler::{DailyScheduler, DayCycle, Executor, Task, TodoListPlanner, VirtualClock};

/// Forwards task boundaries to the presentation bridge.
struct BridgeExecutor<'a> {
    bridge: &'a Bridge,
}

impl Executor for BridgeExecutor<'_> {
    fn classify(&mut self, task: &Task, now: NaiveDateTime, is_start: bool) {
        tracing::info!(
            "🎭 {} {}/{} at {}",
            if is_start { "Begin" } else { "Finish" },
            task.kind,
            task.category,
            now
        );
        self.bridge
            .send(&PresentationEvent::task(&task.kind, &task.category, is_start, now));
    }
}

/// Read and clear the performer inbox, logging what the company sent.
/// Returns how many entries were removed.
fn read_mail<S: MessageStore>(inbox: &MailboxChannel<S>) -> usize {
    let drained = match inbox.drain() {
        Ok(drained) => drained,
        Err(e) => {
            tracing::warn!("⚠️ Failed to read performer inbox: {e}");
            return 0;
        }
    };
    for envelope in &drained.messages {
        let mail = &envelope.mail;
        let field = |key: &str| {
            mail.get(key)
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .unwrap_or_default()
        };
        match &mail.kind {
            MailType::ProjectReview => {
                tracing::info!("📬 Review for {}: {} ({})", field("project_id"), field("result"), field("reason"))
            }
            MailType::ShootSchedule => tracing::info!(
                "📬 Shoot '{}' from {} to {}",
                field("project_name"),
                field("start_time"),
                field("end_time")
            ),
            MailType::Advertisement => {
                tracing::info!("📬 Advertisement '{}' from {}", field("title"), field("brand"))
            }
            other => tracing::info!("📬 {other}: {}", mail.subject),
        }
    }

    drained
        .messages
        .iter()
        .map(|envelope| &envelope.id)
        .chain(drained.malformed.iter())
        .filter(|id| match inbox.ack(id) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("⚠️ Failed to delete {id}: {e}");
                false
            }
        })
        .count()
}

pub async fn run(config: &VtlifeConfig) -> Result<()> {
    let mut clock = VirtualClock::load(&expand_path(&config.clock.state_file), config.clock.ratio);
    let planner = TodoListPlanner::new(&expand_path(&config.schedule.todolist_dir));
    let mut scheduler = DailyScheduler::new(
        DayCycle::new(config.schedule.start_hour, config.schedule.end_hour),
        Box::new(planner),
    );

    let bridge = if config.bridge.enabled {
        match Bridge::bind(&config.bridge.host, config.bridge.port).await {
            Ok(bridge) => bridge,
            Err(e) => {
                tracing::warn!("⚠️ Presentation bridge unavailable ({e}), running without it");
                Bridge::disabled()
            }
        }
    } else {
        Bridge::disabled()
    };
    let mut background = BackgroundTracker::new(config.bridge.weather);
    let mut executor = BridgeExecutor { bridge: &bridge };
    let inbox = match MailboxChannel::open(&config.mailbox.performer_inbox(), MailboxRole::Performer) {
        Ok(inbox) => Some(inbox),
        Err(e) => {
            tracing::warn!("⚠️ Performer inbox unavailable ({e}), not reading mail");
            None
        }
    };

    tracing::info!(
        "🎭 Performer started at {} (ratio {} min/s, day {}:00 to {}:00)",
        clock.now(),
        clock.ratio(),
        config.schedule.start_hour,
        config.schedule.end_hour
    );

    let mut interval = tokio::time::interval(Duration::from_millis(config.runtime.tick_interval_ms));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                tracing::info!("🛑 Shutdown requested");
                break;
            }
        }

        clock.tick();
        let now = clock.now();
        bridge.send(&PresentationEvent::time_update(now));
        if let Some(event) = background.observe(clock.hour()) {
            bridge.send(&event);
        }
        scheduler.tick(now, &mut executor);

        ticks += 1;
        let every = config.runtime.persist_every_ticks;
        if every > 0 && ticks % every == 0 {
            if let Err(e) = clock.persist() {
                tracing::warn!("⚠️ Failed to save clock: {e}");
            }
            if let Some(inbox) = &inbox {
                read_mail(inbox);
            }
        }
    }

    clock.persist()?;
    tracing::info!("💾 Clock saved at {}", clock.now());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vtlife_mailbox::MemoryMessageStore;

    #[test]
    fn test_read_mail_clears_inbox() {
        let inbox = MailboxChannel::new(MailboxRole::Performer, MemoryMessageStore::new());
        inbox
            .send("review", MailType::ProjectReview, json!({"project_id": "p1", "result": "approved"}))
            .unwrap();
        inbox
            .send("shoot", MailType::ShootSchedule, json!({"project_name": "Cooking"}))
            .unwrap();
        inbox.store().insert_raw("mail_zz_broken.json", "{oops");

        assert_eq!(read_mail(&inbox), 3);
        assert!(inbox.store().is_empty());
        assert_eq!(read_mail(&inbox), 0);
    }
}
