//! ctxwatch demo - fires sample saves through an event bus and prints the
//! impacts a change watcher reports.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::{json, Value as Json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ctxwatch_core::ctxwatch_model::{ObjectId, Value};
use ctxwatch_core::{
    ChangeWatcher, ChannelDelegate, Coordinator, EventBus, Impact, ManagedObject, Notification,
    ObjectSet, SaveEvent, Session, WatchConfig, WatchSpec,
};

/// Watch sample saves and print matching impacts as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "ctxwatch-demo", version)]
struct Args {
    /// Watch configuration file (JSON). Uses a built-in configuration if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of saves to publish.
    #[arg(short, long, default_value_t = 5)]
    saves: u64,

    /// Objects per change kind in each save.
    #[arg(long, default_value_t = 4)]
    batch: u64,

    /// Also publish each save from a second, unrelated coordinator.
    #[arg(long)]
    foreign: bool,
}

fn builtin_config() -> WatchConfig {
    WatchConfig::new()
        .with_watch(WatchSpec::new("Post", "published == true && views > 100"))
        .with_watch(WatchSpec::new("Comment", "body like '%urgent%'"))
        .with_watch(WatchSpec::entity("Tag"))
}

fn sample_object(seq: u64) -> ManagedObject {
    let id = ObjectId::from_u64(seq);
    match seq % 3 {
        0 => ManagedObject::new("Post", id)
            .with_field("published", seq % 2 == 0)
            .with_field("views", ((seq * 37) % 400) as i64)
            .with_field("title", format!("post {}", seq)),
        1 => {
            let body = if seq % 5 == 0 { "urgent: please review" } else { "looks good" };
            ManagedObject::new("Comment", id).with_field("body", body)
        }
        _ => ManagedObject::new("Tag", id).with_field("label", format!("tag-{}", seq)),
    }
}

fn sample_save(session: &Arc<Session>, round: u64, batch: u64) -> SaveEvent {
    let base = round * batch * 3;
    let set = |offset: u64| -> ObjectSet {
        (0..batch).map(|i| sample_object(base + offset + i)).collect()
    };
    SaveEvent::new(Arc::clone(session))
        .with_inserted(set(0))
        .with_updated(set(batch))
        .with_deleted(set(batch * 2))
}

fn field_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => json!(b),
        Value::Int32(_) | Value::Int64(_) => json!(value.as_i64()),
        Value::Float32(_) | Value::Float64(_) => json!(value.as_f64()),
        Value::String(s) => json!(s),
        other => json!(format!("{:?}", other)),
    }
}

fn impact_json(impact: &Impact) -> Json {
    let kinds: serde_json::Map<String, Json> = impact
        .iter()
        .map(|(kind, objects)| {
            let mut rows: Vec<&Arc<ManagedObject>> = objects.iter().collect();
            rows.sort_by_key(|o| o.id);
            let rows = rows
                .into_iter()
                .map(|o| {
                    let fields: serde_json::Map<String, Json> = o
                        .fields
                        .iter()
                        .map(|(name, value)| (name.clone(), field_json(value)))
                        .collect();
                    json!({ "id": o.id.to_string(), "entity": o.entity, "fields": fields })
                })
                .collect();
            (kind.to_string(), Json::Array(rows))
        })
        .collect();
    Json::Object(kinds)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ctxwatch_demo=info,ctxwatch_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => WatchConfig::from_path(path)?,
        None => builtin_config(),
    };
    tracing::info!(watches = config.watches.len(), "configuration loaded");

    let bus = Arc::new(EventBus::new());
    let coordinator = Coordinator::new("demo");
    let session = Arc::new(Session::new(&coordinator));
    let foreign_coordinator = Coordinator::new("elsewhere");
    let foreign_session = Arc::new(Session::new(&foreign_coordinator));

    let watcher = ChangeWatcher::new(&session, bus.clone())?;
    watcher.apply_config(&config)?;

    let (delegate, mut impacts) = ChannelDelegate::new();
    let delegate = Arc::new(delegate);
    watcher.set_delegate(&delegate);

    let printer = tokio::spawn(async move {
        let mut received = 0u64;
        while let Some(impact) = impacts.recv().await {
            received += 1;
            println!("{}", impact_json(&impact));
        }
        received
    });

    for round in 0..args.saves {
        bus.publish(&Notification::StoreSaved(sample_save(&session, round, args.batch)));
        if args.foreign {
            bus.publish(&Notification::StoreSaved(sample_save(
                &foreign_session,
                round,
                args.batch,
            )));
        }
    }

    let stats = watcher.stats();
    drop(watcher);
    drop(delegate);

    let received = printer.await?;
    tracing::info!(
        received,
        events_seen = stats.events_seen,
        events_ignored = stats.events_ignored,
        impacts_delivered = stats.impacts_delivered,
        impacts_dropped = stats.impacts_dropped,
        "demo finished"
    );
    eprintln!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
