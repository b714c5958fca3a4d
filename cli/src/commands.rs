use crate::render::render_report;
use crate::replay;
use rankline_core::context::EngineConfigExt;
use rankline_core::engine::{self, RuntimeSettings};
use rankline_core::handlers::SignalTally;
use rankline_core::platform::PlatformFixture;
use rankline_core::{
    ActivityEngine, GuildId, InMemoryPlatform, InboundEvent, PersistenceManager, RankReport,
    RankTable, UserId,
};
use rankline_types::EngineConfig;
use rankline_types::formatting::format_voice_time;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader as AsyncBufReader};
use tokio::sync::mpsc;

fn load_platform(fixture: Option<&Path>) -> Result<InMemoryPlatform, String> {
    let Some(path) = fixture else {
        return Ok(InMemoryPlatform::new());
    };
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read fixture {}: {}", path.display(), e))?;
    let fixture: PlatformFixture = serde_json::from_str(&contents)
        .map_err(|e| format!("invalid fixture {}: {}", path.display(), e))?;
    Ok(InMemoryPlatform::from_fixture(&fixture))
}

async fn build_engine(
    config: &EngineConfig,
    fixture: Option<&Path>,
) -> Result<ActivityEngine<Arc<InMemoryPlatform>>, String> {
    let table = config.rank_table().map_err(|e| e.to_string())?;
    let platform = Arc::new(load_platform(fixture)?);
    let guilds = platform.guild_ids();

    let mut engine = ActivityEngine::new(
        platform,
        table,
        PersistenceManager::new(config.data_path()),
    )
    .with_bot_user(config.bot_user_id.map(UserId));
    engine.prime_invites(&guilds).await;
    Ok(engine)
}

pub async fn replay_file(
    config: &EngineConfig,
    events: &Path,
    fixture: Option<&Path>,
) -> Result<(), String> {
    let mut engine = build_engine(config, fixture).await?;
    let tally = SignalTally::new();
    engine.add_signal_handler(Box::new(tally.clone()));

    let file = std::fs::File::open(events)
        .map_err(|e| format!("failed to open {}: {}", events.display(), e))?;
    let outcome = replay::replay(&mut engine, BufReader::new(file), config.voice_tick()).await?;

    for report in &outcome.reports {
        println!("{}", render_report(report));
    }

    if let Some(end) = outcome.finished_at {
        engine.persist(end).await;
    }

    let counts = tally.counts();
    println!(
        "Replayed {} events ({} voice ticks): {} messages, {} voice, {} invites, {} rank changes",
        outcome.events,
        outcome.voice_ticks,
        counts.messages,
        format_voice_time(counts.voice_minutes),
        counts.invites,
        counts.rank_changes,
    );
    Ok(())
}

/// Read JSON events from stdin until EOF, with live timers.
pub async fn serve(config: &EngineConfig, fixture: Option<&Path>) -> Result<(), String> {
    let engine = build_engine(config, fixture).await?;
    let settings = RuntimeSettings {
        voice_tick: config.voice_tick(),
        persist_interval: config.persist_interval(),
    };

    let (event_tx, event_rx) = mpsc::channel::<InboundEvent>(256);
    let (report_tx, mut report_rx) = mpsc::unbounded_channel::<RankReport>();

    let reader = tokio::spawn(async move {
        let mut lines = AsyncBufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read stdin");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<InboundEvent>(&line) {
                Ok(event) => {
                    if event_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Skipping malformed event"),
            }
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            println!("{}", render_report(&report));
        }
    });

    let engine = engine::run(engine, event_rx, Some(report_tx), settings).await;
    reader.await.map_err(|e| e.to_string())?;
    printer.await.map_err(|e| e.to_string())?;

    println!("Tracked {} records", engine.store().len());
    Ok(())
}

/// Print a rank report straight from the data file.
pub fn show_rank(config: &EngineConfig, guild: u64, user: u64) -> Result<(), String> {
    let table = config.rank_table().map_err(|e| e.to_string())?;
    let store = PersistenceManager::new(config.data_path()).load();
    let (guild, user) = (GuildId(guild), UserId(user));
    let report = RankReport::build(&table, guild, user, store.peek(guild, user));
    print!("{}", render_report(&report));
    Ok(())
}

pub fn check_config(config: &EngineConfig, source: Option<&Path>) -> Result<(), String> {
    let table = config.rank_table().map_err(|e| e.to_string())?;

    match source.map(Path::to_path_buf).or_else(EngineConfig::config_path) {
        Some(path) => println!("Config: {}", path.display()),
        None => println!("Config: defaults"),
    }
    println!("Data file: {}", config.data_path().display());
    println!("Voice tick: {:?}", config.voice_tick());
    println!("Persist interval: {:?}", config.persist_interval());
    if let Some(bot) = config.bot_user_id {
        println!("Bot user: {}", bot);
    }
    print_table(&table);
    Ok(())
}

fn print_table(table: &RankTable) {
    if table.is_empty() {
        println!("No rank tiers configured");
        return;
    }
    println!("{} rank tiers:", table.len());
    for tier in table.tiers() {
        println!(
            "  {:<24} voice {:>8}  messages {:>5}  invites {:>3}",
            tier.name,
            format_voice_time(tier.voice_threshold),
            tier.message_threshold,
            tier.invite_threshold
        );
    }
}
