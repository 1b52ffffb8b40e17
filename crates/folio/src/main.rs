use clap::{Parser, Subcommand};
use folio::config;
use folio::gui::app::AppModel;
use folio::sys::runtime;
use folio::sys::simulate::{self, SimulateOptions};
use relm4::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "folio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read configuration from this file instead of the user config directory
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Drive the hero without a window and print one JSON snapshot per frame.
    Simulate {
        /// Number of frames to run
        #[arg(short = 'n', long, default_value_t = 20)]
        frames: usize,

        /// Viewport width in pixels
        #[arg(long, default_value_t = 1200.0)]
        width: f64,

        /// Viewport height in pixels
        #[arg(long, default_value_t = 900.0)]
        height: f64,

        /// Simulated display refresh rate
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Resize the viewport to this width halfway through the run
        #[arg(long)]
        resize_to: Option<f64>,
    },
    /// Write the default configuration file and print its path.
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Simulate {
            frames,
            width,
            height,
            fps,
            resize_to,
        }) => {
            let config = config::load_or_default(cli.config.as_deref());
            let options = SimulateOptions {
                frames,
                width,
                height,
                fps,
                resize_to,
            };
            simulate::run(&config, options, &mut std::io::stdout().lock())
        }
        Some(Commands::InitConfig) => {
            let path = config::write_default_config(cli.config.as_deref())?;
            println!("{}", path.display());
            Ok(())
        }
        None => {
            let config = config::load_or_default(cli.config.as_deref());
            let (tx, rx) = async_channel::bounded(32);

            // Start Background Services
            if let Some(config_path) = config::watch_path(cli.config.as_deref()) {
                runtime::start_background_services(config_path, tx);
            }

            let app = RelmApp::new("dev.folio.hero");
            app.run::<AppModel>((config, cli.config, rx));
            Ok(())
        }
    }
}
