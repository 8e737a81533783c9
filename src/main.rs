use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use til::{config, site};

#[derive(Parser)]
#[command(name = "til")]
#[command(about = "Tiny static site builder with aggressive CSS ripping")]
#[command(long_about = "\
Tiny static site builder with aggressive CSS ripping

Pages are plain HTML; components are fragments substituted into pages;
styles apply to the whole site but each page only ships the rules it
actually uses. Production builds mangle class/id names and compress
output.

Project structure:

  project/
  ├── til.toml                 # Build config (optional, run 'til gen-config')
  ├── pages/                   # Site pages; tree structure = site structure
  │   ├── index.html           #   → /
  │   └── notes/index.html     #   → /notes/
  ├── components/              # Fragments, substituted via <%name%>
  │   └── header.html
  ├── styles/                  # CSS shared by all pages
  │   └── main.css
  └── dist/                    # Build output (recreated each build)

Dev builds keep identifiers and whitespace readable; --prod rips unused
CSS, renames identifiers, minifies HTML, and compresses artifacts.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Config file, relative to the project directory
    #[arg(long, default_value = "til.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site
    Build {
        /// Production build: rip, rename, minify, compress
        #[arg(long)]
        prod: bool,
    },
    /// Rebuild on source changes (dev profile)
    Watch,
    /// Print a stock til.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { prod } => {
            run_build(&cli, prod)?;
        }
        Command::Watch => {
            // Initial dev build; later failures must not kill the watcher.
            if let Err(e) = run_build(&cli, false) {
                eprintln!("build error: {e}");
            }

            let (tx, rx) = std::sync::mpsc::channel();
            let mut debouncer = new_debouncer(
                Duration::from_millis(200),
                move |result: DebounceEventResult| {
                    if let Ok(events) = result {
                        for event in events {
                            let _ = tx.send(event.path);
                        }
                    }
                },
            )?;
            for dir in ["pages", "components", "styles"] {
                let path = cli.source.join(dir);
                if path.is_dir() {
                    debouncer.watcher().watch(&path, RecursiveMode::Recursive)?;
                }
            }
            println!("watching {} for changes", cli.source.display());

            while let Ok(path) = rx.recv() {
                println!("changed: {}", path.display());
                if let Err(e) = run_build(&cli, false) {
                    eprintln!("build error: {e}");
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_build(cli: &Cli, prod: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = if cli.config.is_absolute() {
        cli.config.clone()
    } else {
        cli.source.join(&cli.config)
    };
    let config = config::SiteConfig::load(&config_path, prod)?;

    let start = Instant::now();
    let summary = site::build(&cli.source, &cli.output, &config)?;
    println!("{summary}");
    println!("build finished in {}", format_duration(start.elapsed()));
    Ok(())
}

/// `340ms` under a second, `3.150s` above.
fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs > 0 {
        return format!("{}.{:03}s", secs, elapsed.subsec_millis());
    }
    let ms = f64::from(elapsed.subsec_nanos()) / 1e6;
    if ms >= 100.0 {
        format!("{ms:.0}ms")
    } else if ms >= 10.0 {
        format!("{ms:.1}ms")
    } else {
        format!("{ms:.2}ms")
    }
}
