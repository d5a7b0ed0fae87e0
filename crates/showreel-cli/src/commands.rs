//! Command implementations

use crate::output;
use anyhow::Context;
use serde::Serialize;
use showreel_core::{
    sim::{Scenario, SimProvider, SimSurface},
    AdaptiveVideoPlayer, BindingState, EngineConfig, PlaybackEventRecord, PlayerProps,
    RenderOutput, Strategy,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Report produced by `probe`
#[derive(Debug, Serialize)]
struct ProbeReport {
    source: String,
    strategy: Option<Strategy>,
    state: BindingState,
    engines_constructed: usize,
    render: RenderOutput,
}

fn strategy_for(state: BindingState) -> Option<Strategy> {
    match state {
        BindingState::NativeBound => Some(Strategy::Native),
        BindingState::EngineBound => Some(Strategy::Engine),
        _ => None,
    }
}

/// Report produced by `simulate`
#[derive(Debug, Serialize)]
struct SimulateReport {
    source: String,
    final_state: BindingState,
    start_load_calls: usize,
    recover_calls: usize,
    destroy_calls: usize,
    render: RenderOutput,
    diagnostics: Vec<PlaybackEventRecord>,
}

fn mount(
    source: &str,
    native: bool,
    no_engine: bool,
) -> anyhow::Result<(AdaptiveVideoPlayer, Arc<SimProvider>)> {
    let props = PlayerProps::new(source).context("invalid source URI")?;
    let surface = if native {
        SimSurface::native()
    } else {
        SimSurface::plain()
    };
    let provider = if no_engine {
        SimProvider::unsupported()
    } else {
        SimProvider::supported()
    };
    let player = AdaptiveVideoPlayer::mount(props, surface, provider.clone())?;
    Ok((player, provider))
}

/// Run the capability probe with the stated runtime capabilities
pub fn probe(source: &str, native: bool, no_engine: bool, format: &str) -> anyhow::Result<()> {
    let (player, provider) = mount(source, native, no_engine)?;

    let report = ProbeReport {
        source: source.to_string(),
        strategy: strategy_for(player.state()),
        state: player.state(),
        engines_constructed: provider.log().created,
        render: player.render(),
    };

    match output::OutputFormat::from(format) {
        output::OutputFormat::Json => println!("{}", output::to_json(&report)?),
        output::OutputFormat::Text => {
            println!("Source:  {}", report.source);
            match report.strategy {
                Some(strategy) => println!("Strategy: {strategy}"),
                None => println!("Strategy: none"),
            }
            println!("State:   {}", report.state);
            println!("Engines: {}", report.engines_constructed);
            match &report.render {
                RenderOutput::Video(_) => println!("Render:  video surface"),
                RenderOutput::ErrorPanel { message, .. } => {
                    println!("Render:  error panel ({message})")
                }
            }
        }
    }

    Ok(())
}

/// Replay a scenario's engine events through a freshly mounted binding
pub async fn simulate(
    source: &str,
    scenario_path: Option<PathBuf>,
    native: bool,
    no_engine: bool,
    format: &str,
) -> anyhow::Result<()> {
    let scenario = match scenario_path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            Scenario::from_json(&json)?
        }
        None => Scenario::fault_run(),
    };

    let (mut player, provider) = mount(source, native, no_engine)?;

    // Mirror diagnostics to the log as they are emitted
    let mut rx = player.diagnostics().subscribe();
    let tail = tokio::spawn(async move {
        while let Ok(record) = rx.recv().await {
            info!(sequence = record.sequence, event = ?record.event, "diagnostic");
        }
    });

    scenario.replay(&mut player)?;

    let log = provider.log();
    let report = SimulateReport {
        source: source.to_string(),
        final_state: player.state(),
        start_load_calls: log.start_load,
        recover_calls: log.recover_media_error,
        destroy_calls: log.destroy,
        render: player.render(),
        diagnostics: player.diagnostics().events(),
    };

    player.unmount();
    tail.abort();

    match output::OutputFormat::from(format) {
        output::OutputFormat::Json => println!("{}", output::to_json(&report)?),
        output::OutputFormat::Text => {
            println!("Source:        {}", report.source);
            println!("Final state:   {}", report.final_state);
            println!("Reloads:       {}", report.start_load_calls);
            println!("Recoveries:    {}", report.recover_calls);
            println!("Teardowns:     {}", report.destroy_calls);
            match &report.render {
                RenderOutput::Video(_) => println!("Render:        video surface"),
                RenderOutput::ErrorPanel { message, .. } => {
                    println!("Render:        error panel ({message})")
                }
            }
            println!();
            println!("Diagnostics ({} records):", report.diagnostics.len());
            for record in &report.diagnostics {
                println!("  #{:<3} {:?}", record.sequence, record.event);
            }
        }
    }

    Ok(())
}

/// Print the fixed engine tuning
pub fn tuning(format: &str) -> anyhow::Result<()> {
    let config = EngineConfig::default();

    match output::OutputFormat::from(format) {
        output::OutputFormat::Json => println!("{}", output::to_json(&config)?),
        output::OutputFormat::Text => {
            println!("Back buffer retained:  {} s", config.back_buffer_secs);
            println!("Forward buffer target: {} s", config.max_buffer_secs);
            println!("Forward buffer cap:    {} s", config.max_max_buffer_secs);
            println!("Buffer memory cap:     {} bytes", config.max_buffer_bytes);
            println!("Tolerated buffer gap:  {} s", config.max_buffer_hole_secs);
            println!("Worker thread:         {}", config.enable_worker);
            println!("Low-latency mode:      {}", config.low_latency_mode);
        }
    }

    Ok(())
}
