//! Company agent loop, one-shot batch and inbox submission.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use vtlife_company::{ApprovedStore, CompanyWorkflow, RandomSkip, WindowDefaults, policy_for};
use vtlife_core::VtlifeConfig;
use vtlife_core::config::expand_path;
use vtlife_mailbox::{FsMessageStore, MailType, MailboxChannel, MailboxRole};
use vtlife_scheduler::{DayCycle, DayEdge, VirtualClock};

fn build_workflow(config: &VtlifeConfig) -> Result<CompanyWorkflow<FsMessageStore>> {
    let inbox_dir = config.mailbox.company_inbox();
    let outbox_dir = config.mailbox.performer_inbox();
    let inbox = MailboxChannel::open(&inbox_dir, MailboxRole::Company)
        .with_context(|| format!("opening company inbox {}", inbox_dir.display()))?;
    let outbox = MailboxChannel::open(&outbox_dir, MailboxRole::Performer)
        .with_context(|| format!("opening performer inbox {}", outbox_dir.display()))?;

    let company = &config.company;
    let workflow = CompanyWorkflow::new(
        inbox,
        outbox,
        policy_for(company.review_mode),
        Box::new(RandomSkip::new(company.skip_probability)),
    )
    .with_store(ApprovedStore::new(&expand_path(&company.approved_store)))
    .with_window_defaults(WindowDefaults {
        shoot_hour: company.default_shoot_hour,
        duration: chrono::Duration::hours(i64::from(company.shoot_duration_hours)),
    });
    Ok(workflow)
}

fn company_clock(config: &VtlifeConfig) -> VirtualClock {
    VirtualClock::load(&expand_path(&config.company.clock_state_file), config.clock.ratio)
}

/// Run the company agent: one batch each time the virtual day reaches the batch hour.
pub async fn run(config: &VtlifeConfig) -> Result<()> {
    let mut workflow = build_workflow(config)?;
    let mut clock = company_clock(config);
    let mut cycle = DayCycle::new(config.batch_hour(), config.schedule.end_hour);

    tracing::info!(
        "🏢 Company started at {} (batch at {}:00, {:?} review)",
        clock.now(),
        config.batch_hour(),
        config.company.review_mode
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
        if cycle.observe(clock.hour()) == Some(DayEdge::Start) {
            if let Err(e) = workflow.daily_batch(clock.now()) {
                tracing::warn!("⚠️ Daily batch failed: {e}");
            }
        }

        ticks += 1;
        let every = config.runtime.persist_every_ticks;
        if every > 0 && ticks % every == 0 {
            if let Err(e) = clock.persist() {
                tracing::warn!("⚠️ Failed to save company clock: {e}");
            }
        }
    }

    clock.persist()?;
    tracing::info!("💾 Company clock saved at {}", clock.now());
    Ok(())
}

/// Run a single batch at the company clock's current virtual time.
pub fn run_once(config: &VtlifeConfig) -> Result<()> {
    let mut workflow = build_workflow(config)?;
    let clock = company_clock(config);
    let report = workflow.daily_batch(clock.now())?;

    println!("🏢 Batch at {}", clock.now());
    println!("   Consumed:       {}", report.consumed);
    println!("   Approved:       {}", report.approved);
    println!("   Rejected:       {}", report.rejected);
    println!("   Advertisements: {}", report.advertisements);
    println!("   Malformed:      {}", report.malformed);
    if report.deferred > 0 {
        println!("   Deferred:       {}", report.deferred);
    }
    match &report.scheduled {
        Some(shoot) => println!(
            "   🎬 Shoot:        {} ({} to {})",
            shoot.project_name, shoot.window.start, shoot.window.end
        ),
        None if report.skipped_scheduling => println!("   🎲 Shoot scheduling skipped this cycle"),
        None => println!("   No shoot scheduled"),
    }
    println!("   Queue:          {} approved projects", workflow.queue().len());
    Ok(())
}

/// Place a JSON payload in the company inbox.
pub fn submit(config: &VtlifeConfig, file: &Path, kind: MailType) -> Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let payload: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;

    let subject = ["project_name", "ad_title", "title", "subject"]
        .iter()
        .find_map(|key| {
            payload
                .get("project")
                .and_then(|p| p.get(*key))
                .or_else(|| payload.get(*key))
                .and_then(|v| v.as_str())
        })
        .unwrap_or("submission")
        .to_string();

    let inbox = MailboxChannel::open(&config.mailbox.company_inbox(), MailboxRole::Company)?;
    let id = inbox.send(&subject, kind.clone(), payload)?;
    println!("📨 Submitted {kind} '{subject}' as {id}");
    Ok(())
}
