//! AIS Traffic Generator
//!
//! Runs a scenario through the traffic engine and writes the resulting
//! AIVDM sentences (and optional GGA/RMC fixes) to stdout, one per line.
//! Logs go to stderr so the sentence stream can be piped straight into a
//! chart plotter or decoder.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use ais_protocol::Channel;
use ais_sim::{ScenarioConfig, TrafficEngine, Transmission};
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChannelArg {
    A,
    B,
}

impl From<ChannelArg> for Channel {
    fn from(c: ChannelArg) -> Self {
        match c {
            ChannelArg::A => Channel::A,
            ChannelArg::B => Channel::B,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Generate simulated AIS and GPS NMEA traffic")]
struct Args {
    /// JSON scenario file; the built-in San Francisco Bay demo when omitted
    scenario: Option<PathBuf>,

    /// Override the scenario's simulated duration, in seconds (0 = unbounded)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Override the scenario's tick size, in seconds
    #[arg(short, long)]
    step: Option<f64>,

    /// Pace ticks against the wall clock instead of running flat out
    #[arg(short, long)]
    realtime: bool,

    /// Suppress GGA/RMC output
    #[arg(long)]
    no_gps: bool,

    /// Send every AIS message on one channel
    #[arg(long, value_enum)]
    channel: Option<ChannelArg>,

    /// Write one JSON object per transmission, with input traces
    #[arg(long)]
    json: bool,

    /// Print the effective scenario as JSON and exit
    #[arg(long)]
    print_scenario: bool,
}

impl Args {
    fn load_scenario(&self) -> Result<ScenarioConfig> {
        let mut scenario = match &self.scenario {
            Some(path) => ScenarioConfig::load(path)
                .with_context(|| format!("loading scenario {}", path.display()))?,
            None => ScenarioConfig::default(),
        };
        if let Some(duration) = self.duration {
            scenario.duration_secs = duration;
        }
        if let Some(step) = self.step {
            scenario.step_secs = step;
        }
        if self.no_gps {
            scenario.gps_interval_secs = None;
        }
        scenario.validate()?;
        Ok(scenario)
    }
}

/// Decides when the next round of GPS fixes is due
#[derive(Debug)]
struct GpsPacer {
    interval: Option<Duration>,
    next: Duration,
}

impl GpsPacer {
    fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            next: Duration::ZERO,
        }
    }

    /// Whether fixes are due at `elapsed`; skips missed slots rather than bursting
    fn due(&mut self, elapsed: Duration) -> bool {
        let Some(interval) = self.interval.filter(|i| !i.is_zero()) else {
            return false;
        };
        if elapsed < self.next {
            return false;
        }
        while self.next <= elapsed {
            self.next += interval;
        }
        true
    }
}

struct Output<W: Write> {
    out: W,
    json: bool,
}

impl<W: Write> Output<W> {
    fn transmission(&mut self, transmission: &Transmission) -> Result<()> {
        if self.json {
            serde_json::to_writer(&mut self.out, transmission)?;
            writeln!(self.out)?;
        } else {
            for line in &transmission.sentences {
                writeln!(self.out, "{line}")?;
            }
        }
        Ok(())
    }

    fn sentences(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ais_traffic=info,ais_protocol=info,ais_scheduler=info,ais_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let scenario = args.load_scenario()?;

    if args.print_scenario {
        println!("{}", serde_json::to_string_pretty(&scenario)?);
        return Ok(());
    }
    if scenario.duration().is_none() && !args.realtime {
        bail!("an unbounded run (duration 0) needs --realtime");
    }

    let mut engine = TrafficEngine::from_scenario(&scenario)?;
    if let Some(channel) = args.channel {
        engine.force_channel(channel.into());
    }

    info!(
        "Starting '{}' at {} with {} targets",
        scenario.name,
        scenario.start_time,
        engine.targets().count()
    );

    let stdout = io::stdout();
    let mut output = Output {
        out: BufWriter::new(stdout.lock()),
        json: args.json,
    };
    run(&mut engine, &scenario, args.realtime, &mut output).await?;
    output.flush()?;

    let stats = engine.stats();
    info!(
        "Finished after {:.0} simulated seconds: {} ticks, {} AIS messages in {} sentences, {} GPS sentences, {} errors",
        engine.elapsed().as_secs_f64(),
        stats.ticks,
        stats.ais_messages,
        stats.ais_sentences,
        stats.gps_sentences,
        stats.errors
    );
    info!("Scheduler statistics:\n{}", engine.statistics());
    Ok(())
}

async fn run<W: Write>(
    engine: &mut TrafficEngine,
    scenario: &ScenarioConfig,
    realtime: bool,
    output: &mut Output<W>,
) -> Result<()> {
    let step = scenario.step();
    let end = scenario.duration();
    let mut gps = GpsPacer::new(scenario.gps_interval());

    let mut ticker = tokio::time::interval(step.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        if end.is_some_and(|end| engine.elapsed() >= end) {
            break;
        }
        if realtime {
            tokio::select! {
                _ = ticker.tick() => {}
                result = &mut ctrl_c => {
                    if let Err(e) = result {
                        warn!("Failed to listen for interrupt: {}", e);
                    }
                    info!("Interrupted");
                    break;
                }
            }
        }

        // The last tick may be shorter so the run ends exactly on time
        let this_step = match end {
            Some(end) => step.min(end.saturating_sub(engine.elapsed())),
            None => step,
        };
        for transmission in engine.tick(this_step) {
            output.transmission(&transmission)?;
        }
        if gps.due(engine.elapsed()) {
            let lines = engine.gps_fixes();
            output.sentences(&lines)?;
        }
        if realtime {
            output.flush()?;
        }
    }
    Ok(())
}
