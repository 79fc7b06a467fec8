use anyhow::{Context, Result};
use clap::Parser;
use long_division::model::{PlaybackConfig, PlaybackEvent, Walkthrough};
use long_division::orchestrator::Playback;
use long_division::{text_summary, Problem};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "long-division",
    version,
    about = "Step-by-step long division with optional TUI"
)]
pub struct Cli {
    /// Number to divide (one or more digits)
    pub dividend: String,

    /// Number to divide by (must be positive)
    pub divisor: String,

    /// Print the walkthrough as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print the steps as text and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// In text mode, print the grid after every step
    #[arg(long)]
    pub grids: bool,

    /// Pause between steps in text mode
    #[arg(long, default_value = "0s")]
    pub step_delay: humantime::Duration,

    /// Delay before a new step's entrance animation starts
    #[arg(long, default_value = "50ms")]
    pub reveal_delay: humantime::Duration,

    /// How long entrance animations stay on
    #[arg(long, default_value = "400ms")]
    pub animation: humantime::Duration,

    /// Export the walkthrough as JSON
    #[arg(long)]
    pub export_json: Option<std::path::PathBuf>,

    /// Log debug output to stderr (ignored by the TUI)
    #[arg(long, short)]
    pub verbose: bool,
}

/// Walkthrough plus the playback settings it was produced with.
#[derive(Serialize)]
struct Report<'a> {
    config: &'a PlaybackConfig,
    #[serde(flatten)]
    walkthrough: &'a Walkthrough,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!(
            "--json and --text are mutually exclusive. Pick one output mode."
        ));
    }

    let problem =
        Problem::parse(&args.dividend, &args.divisor).context("invalid division problem")?;

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args, problem).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            return run_text(args, problem).await;
        }
    }

    if args.json {
        return run_json(args, problem).await;
    }

    run_text(args, problem).await
}

/// Build a `PlaybackConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> PlaybackConfig {
    PlaybackConfig {
        reveal_delay: Duration::from(args.reveal_delay),
        animation_duration: Duration::from(args.animation),
        step_delay: Duration::from(args.step_delay),
    }
}

async fn run_json(args: Cli, problem: Problem) -> Result<()> {
    let cfg = build_config(&args);
    let walkthrough = long_division::sequencer::build(&problem);

    handle_exports(&args, &cfg, &walkthrough)?;

    let (out_tx, out_handle) = spawn_output_writer();
    let out = serde_json::to_string_pretty(&Report {
        config: &cfg,
        walkthrough: &walkthrough,
    })?;
    let _ = out_tx.send(OutputLine::Stdout(out));
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

async fn run_text(args: Cli, problem: Problem) -> Result<()> {
    let cfg = build_config(&args);
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<PlaybackEvent>();

    let mut playback = Playback::new().with_events(evt_tx);
    playback.begin(problem);

    let _ = out_tx.send(OutputLine::Stderr(format!(
        "== {} ({} steps) ==",
        playback.problem().map(ToString::to_string).unwrap_or_default(),
        playback.step_count()
    )));

    loop {
        if let (Some(index), Some(step)) = (playback.active_step(), playback.current_step()) {
            for line in text_summary::format_step(index, step, playback.dimensions(), args.grids) {
                let _ = out_tx.send(OutputLine::Stdout(line));
            }
        }

        while let Ok(ev) = evt_rx.try_recv() {
            if let PlaybackEvent::Completed {
                quotient,
                remainder,
            } = ev
            {
                let _ = out_tx.send(OutputLine::Stderr(format!(
                    "Done: quotient {quotient}, remainder {remainder}"
                )));
            }
        }

        if !playback.can_advance() {
            break;
        }
        if !cfg.step_delay.is_zero() {
            tokio::time::sleep(cfg.step_delay).await;
        }
        playback.advance();
    }

    let walkthrough = playback
        .walkthrough()
        .context("playback finished without a walkthrough")?;
    handle_exports(&args, &cfg, walkthrough)?;

    // With --grids the last streamed step already shows the finished grid.
    for line in text_summary::closing_lines(walkthrough, !args.grids) {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Write the requested exports for a built walkthrough.
pub fn handle_exports(args: &Cli, cfg: &PlaybackConfig, walkthrough: &Walkthrough) -> Result<()> {
    if let Some(p) = args.export_json.as_deref() {
        let json = serde_json::to_string_pretty(&Report {
            config: cfg,
            walkthrough,
        })?;
        std::fs::write(p, json).with_context(|| format!("write {}", p.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("long-division").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn config_comes_from_flags() {
        let cfg = build_config(&parse(&["84", "3", "--reveal-delay", "10ms", "--step-delay", "1s"]));
        assert_eq!(cfg.reveal_delay, Duration::from_millis(10));
        assert_eq!(cfg.animation_duration, Duration::from_millis(400));
        assert_eq!(cfg.step_delay, Duration::from_secs(1));
    }

    #[test]
    fn report_flattens_walkthrough_next_to_config() {
        let cfg = build_config(&parse(&["7", "3"]));
        let walkthrough = long_division::sequencer::build(&Problem::new(7, 3).unwrap());
        let value = serde_json::to_value(Report {
            config: &cfg,
            walkthrough: &walkthrough,
        })
        .unwrap();

        assert_eq!(value["config"]["reveal_delay"], "50ms");
        assert_eq!(value["config"]["animation_duration"], "400ms");
        assert_eq!(value["problem"]["dividend"], "7");
        assert_eq!(value["problem"]["divisor"], 3);
        assert_eq!(value["quotient"], "2");
        assert_eq!(value["remainder"], 1);
        assert_eq!(
            value["steps"].as_array().map(Vec::len),
            Some(walkthrough.steps.len())
        );
        assert_eq!(value["steps"][0]["kind"], "intro");
        assert!(value.get("walkthrough").is_none());
    }

    #[tokio::test]
    async fn conflicting_modes_are_refused() {
        let err = run(parse(&["84", "3", "--json", "--text"])).await.unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[tokio::test]
    async fn export_writes_report_file() {
        let path = std::env::temp_dir().join(format!("long-division-{}.json", std::process::id()));
        let path_arg = path.to_string_lossy().into_owned();
        run(parse(&["100", "5", "--json", "--export-json", &path_arg]))
            .await
            .unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(written["quotient"], "20");
        assert!(written["config"].is_object());
    }
}
