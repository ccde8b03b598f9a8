use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use vanity_engine::logging::{init_logging, LoggingConfig};
use vanity_plot::{Session, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "vanity-plot-demo")]
#[command(about = "Opens a plot window and draws into it until the window is closed")]
struct Args {
    /// Viewer executable (defaults to VANITY_PLOT_VIEWER, then the one
    /// next to this binary)
    #[arg(long)]
    viewer: Option<PathBuf>,

    /// Animate a sine wave in batched frames instead of the static plot
    #[arg(long)]
    animate: bool,

    /// Log filter for both processes (env_logger syntax)
    #[arg(long)]
    log: Option<String>,
}

const POLL: Duration = Duration::from_millis(16);

fn main() {
    let args = Args::parse();
    init_logging(LoggingConfig::labeled("plot").with_filter(args.log.clone()));

    if let Err(e) = run(args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = SessionConfig {
        viewer: args.viewer,
        title: "vanity plot demo".to_string(),
        log_filter: args.log,
        ..SessionConfig::default()
    };
    let mut plot = Session::open_with(&config, 800, 600).context("failed to open the plot")?;

    if args.animate {
        animate(&mut plot);
    } else {
        draw_static(&mut plot);
        while plot.is_alive() {
            std::thread::sleep(POLL);
        }
    }

    log::info!("plot window closed");
    plot.close();
    Ok(())
}

fn draw_static(plot: &mut Session) {
    let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
    let ys = [1.0, 4.0, 9.0, 16.0, 25.0];

    plot.line(0.0, 1.0, 0.0, 25.0);
    plot.polyline(&xs, &ys);

    plot.set_color(1.0, 0.0, 0.0);
    plot.line(0.0, 0.0, 5.0, 0.0);
    plot.line(5.0, -1.0, 0.0, -1.0);

    plot.points(&xs, &ys);
}

fn animate(plot: &mut Session) {
    const SAMPLES: usize = 200;
    let xs: Vec<f32> = (0..SAMPLES)
        .map(|i| i as f32 / (SAMPLES - 1) as f32 * std::f32::consts::TAU)
        .collect();

    let mut phase = 0.0f32;
    while plot.is_alive() {
        let ys: Vec<f32> = xs.iter().map(|x| (x + phase).sin()).collect();

        plot.begin_frame();
        plot.set_color(0.0, 0.0, 1.0);
        plot.polyline(&xs, &ys);
        plot.set_color(1.0, 0.0, 0.0);
        plot.point(xs[0], ys[0]);
        plot.end_frame();

        phase += 0.05;
        std::thread::sleep(POLL);
    }
}
