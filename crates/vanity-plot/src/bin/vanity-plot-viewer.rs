//! Plot viewer process. Reads drawing commands from stdin and renders them
//! until stdin closes or the window is closed.

use clap::Parser;

use vanity_engine::logging::{init_logging, LoggingConfig};
use vanity_plot::Viewer;

#[derive(Parser, Debug)]
#[command(name = "vanity-plot-viewer")]
#[command(about = "Renders a vanity plot command stream read from stdin")]
struct Args {
    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Window title
    #[arg(long, default_value = "vanity plot")]
    title: String,

    /// Log filter (env_logger syntax), overrides VANITY_PLOT_LOG
    #[arg(long)]
    log: Option<String>,
}

fn main() {
    let args = Args::parse();
    init_logging(LoggingConfig::labeled("viewer").with_filter(args.log));

    log::debug!("viewer window {}x{}", args.width, args.height);

    let result = Viewer::new()
        .title(args.title)
        .size(f64::from(args.width.max(1)), f64::from(args.height.max(1)))
        .run(std::io::stdin());

    if let Err(e) = result {
        log::error!("viewer failed: {e:#}");
        std::process::exit(1);
    }
}
