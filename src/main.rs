use clap::Parser;
use std::process;
use tracing::Level;

use sitemirror::cli::{report, Cli, InteractivePreflight};
use sitemirror::core::{print_error_message, CrawlContext, Mirror, MirrorOptions};
use sitemirror::env::{self, EnvVar};
use sitemirror::utils::Deadline;

fn main() {
    env::load_dotenv();
    let cli = Cli::parse();

    if cli.env_docs {
        print!("{}", env::generate_env_docs());
        return;
    }

    let mut options = match MirrorOptions::from_env() {
        Ok(options) => options,
        Err(error) => {
            print_error_message(&format!("Error: {}", error));
            process::exit(1);
        }
    };
    cli.apply(&mut options);
    init_logging(options.silent);

    if let Err(error) = options.validate() {
        print_error_message(&format!("Error: {}", error));
        process::exit(1);
    }

    // Everything from here on counts against the global timeout
    let deadline = Deadline::after(options.timeout);

    let context = match CrawlContext::from_input(&cli.input) {
        Ok(context) => context,
        Err(error) => {
            print_error_message(&format!("Error: {}", error));
            process::exit(1);
        }
    };

    let silent = options.silent;
    let preflight = InteractivePreflight::new(cli.yes, silent);
    let mirror = match Mirror::new(context, options, deadline) {
        Ok(mirror) => mirror,
        Err(error) => {
            print_error_message(&format!("Error: {}", error));
            process::exit(1);
        }
    };

    let outcome = mirror.execute(&preflight);
    process::exit(report(&outcome, silent));
}

fn init_logging(silent: bool) {
    let level = if silent {
        Level::ERROR
    } else {
        env::core::LogLevel::get_or_default("info".to_string())
            .parse()
            .unwrap_or(Level::INFO)
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
