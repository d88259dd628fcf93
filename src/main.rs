// Terminal chat thread with the travel assistant.
// Run with: cargo run --bin tripchat

use std::sync::Arc;

use dotenv::dotenv;
use futures::future::join_all;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tripchat::{
    config::Config,
    events::ThreadEvent,
    metrics::MetricsRegistry,
    render::{Renderer, TextRenderer},
    seed::demo_conversation,
    RuleSummarizer, ThreadController,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::from_env();
    let metrics = MetricsRegistry::new();
    let summarizer = Arc::new(RuleSummarizer::new(cfg.summary_latency));
    let history = if cfg.seed_demo_thread { demo_conversation() } else { Vec::new() };
    let controller = ThreadController::with_history(&cfg, summarizer, history)?;

    let renderer = TextRenderer;
    let initial = controller.snapshot().await;
    if !initial.is_empty() {
        println!("{}", renderer.render(&initial));
    }

    let mut events = controller.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ThreadEvent::MessageAppended(msg)) => println!("{}", renderer.render_message(&msg)),
                Ok(ThreadEvent::PlaceholderInserted(entry)) | Ok(ThreadEvent::SummaryResolved(entry)) => {
                    println!("{}", renderer.render_summary(&entry))
                }
                Ok(ThreadEvent::PlaceholderRemoved { .. }) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Renderer fell behind thread events"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    info!(triggers = ?cfg.triggers, "Thread ready, type a message and press enter");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if let Some(receipt) = controller.send(&line).await {
            in_flight.extend(receipt.summary);
        }
        in_flight.retain(|task| !task.is_finished());
    }

    if !in_flight.is_empty() {
        info!(pending = in_flight.len(), "Waiting for outstanding summaries");
        join_all(in_flight.into_iter().map(|task| task.wait())).await;
    }

    drop(controller);
    printer.await?;

    if cfg.dump_metrics {
        print!("{}", metrics.gather_metrics());
    }

    Ok(())
}
