//! 命令行交互：参数解析、输入校验、输出目录准备与结果报告

use clap::Parser;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{
    format_output_dir, format_thousands, print_error_message, print_info_message, CrawlContext,
    MirrorError, MirrorOptions, MirrorOutcome, OutputLayout, Preflight, DEFAULT_OUTPUT_DIR,
};
use crate::network::session::Session;

const SEPARATOR: &str = "==================================================";

#[derive(Parser, Debug)]
#[command(
    name = "sitemirror",
    version,
    about = "Mirror a web page and everything it references into a local folder"
)]
pub struct Cli {
    /// Local directory, local HTML file or http(s) URL to mirror
    #[arg(default_value = "front")]
    pub input: String,

    /// Output directory ("." means the default; %timestamp% is substituted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Replace an existing output directory without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Global timeout for the whole run, in seconds
    #[arg(short, long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Suppress progress output
    #[arg(short, long)]
    pub silent: bool,

    /// Print the supported environment variables and exit
    #[arg(long)]
    pub env_docs: bool,
}

impl Cli {
    /// Applies command-line overrides on top of environment configuration.
    ///
    /// A global timeout given here also caps the per-request, render and
    /// wait limits at half of it when they would not fit inside it.
    pub fn apply(&self, options: &mut MirrorOptions) {
        match self.output.as_deref().map(str::trim) {
            Some("") | Some(".") => options.output_dir = PathBuf::from(DEFAULT_OUTPUT_DIR),
            Some(output) => options.output_dir = PathBuf::from(format_output_dir(output)),
            None => {
                let template = options.output_dir.to_string_lossy().into_owned();
                options.output_dir = PathBuf::from(format_output_dir(&template));
            }
        }

        if let Some(seconds) = self.timeout {
            let timeout = Duration::from_secs(seconds);
            options.timeout = timeout;

            for limit in [
                &mut options.resource_timeout,
                &mut options.render_timeout,
                &mut options.render_wait,
            ] {
                if *limit >= timeout {
                    *limit = timeout / 2;
                }
            }
        }

        options.silent |= self.silent;
    }
}

/// Validator and output preparer backed by the terminal
pub struct InteractivePreflight {
    assume_yes: bool,
    silent: bool,
}

impl InteractivePreflight {
    pub fn new(assume_yes: bool, silent: bool) -> Self {
        InteractivePreflight { assume_yes, silent }
    }

    fn info(&self, msg: &str) {
        if !self.silent {
            print_info_message(msg);
        }
    }
}

impl Preflight for InteractivePreflight {
    fn validate(&self, context: &CrawlContext, session: &Session) -> Result<(), MirrorError> {
        if context.is_remote {
            let url = context.start_url()?;
            return session.probe(&url).map_err(|e| match e {
                e if e.is_deadline() => e,
                e => MirrorError::Unreachable(e.to_string()),
            });
        }

        let path = context.start_path();
        if !path.is_file() {
            return Err(MirrorError::Unreachable(format!(
                "input file not found ({})",
                path.display()
            )));
        }

        Ok(())
    }

    fn prepare_output(&self, layout: &OutputLayout) -> Result<(), MirrorError> {
        if layout.root.is_dir() {
            print_info_message(&format!(
                "\n⚠️  Output directory already exists.\n   Path: {}",
                absolute_display(&layout.root)
            ));

            if !self.assume_yes && !confirm("   Delete it and create it again? (Y/n): ")? {
                print_info_message("❌ Cancelled.");
                return Err(MirrorError::Aborted);
            }

            self.info("♻️  Removing existing output directory...");
            fs::remove_dir_all(&layout.root).map_err(|e| MirrorError::io(&layout.root, e))?;
        }

        layout.create()
    }

    fn announce(&self, context: &CrawlContext, layout: &OutputLayout) {
        let mode = if context.is_remote {
            "web rendering (headless browser)"
        } else {
            "local files"
        };

        self.info(&format!(
            "🚀 Starting ({})\n   🔗 Source: {} (start: {})\n   📂 Output: {}",
            mode,
            context.root,
            context.start_document,
            absolute_display(&layout.root)
        ));
        self.info(SEPARATOR);
    }
}

fn absolute_display(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// Asks a yes/no question; an empty answer means yes, end of input means no.
fn confirm(prompt: &str) -> Result<bool, MirrorError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|e| MirrorError::io(Path::new("<stdout>"), e))?;

    let mut answer = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| MirrorError::io(Path::new("<stdin>"), e))?;
    if read == 0 {
        return Ok(false);
    }

    Ok(matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes"))
}

/// Prints the final status and statistics, returning the process exit code.
///
/// 0 on success or when the user declined to overwrite the output, 2 when
/// the global timeout elapsed, 1 for every other failure.
pub fn report(outcome: &MirrorOutcome, silent: bool) -> i32 {
    let code = match &outcome.result {
        Ok(()) => {
            if !silent {
                print_info_message(SEPARATOR);
                print_info_message("✅ Done!");
            }
            0
        }
        Err(MirrorError::Aborted) => return 0,
        Err(e) if e.is_deadline() => {
            if !silent {
                print_info_message(SEPARATOR);
            }
            print_error_message(&format!("*** Warning : Timeout ({e})"));
            2
        }
        Err(e) => {
            if !silent {
                print_info_message(SEPARATOR);
            }
            print_error_message(&format!("❌ Error: {e}"));
            1
        }
    };

    if !silent {
        print_info_message(&format!(
            "Total {} files, saved {} bytes",
            outcome.statistics.files_written,
            format_thousands(outcome.statistics.bytes_written)
        ));
    }

    code
}
