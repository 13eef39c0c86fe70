use clap::{Parser, Subcommand};
use folio::output::CheckResult;
use folio::server::AppState;
use folio::{config, index, metadata, output, server, thumbnail};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Serve a directory of images as a browsable gallery")]
#[command(long_about = "\
Serve a directory of images as a browsable gallery

Every image directly inside the gallery root is listed, sorted by name.
Each one gets a detail page with previous/next navigation and a download
button, and the whole set can be downloaded as one zip.

Gallery structure:

  gallery/
  ├── folio.toml          # Optional config
  ├── beach.jpg           # Listed: jpg jpeg png gif bmp webp svg
  ├── sunset.png
  ├── notes.txt           # Ignored: not an image extension
  └── thumbnails/         # Optional, never listed
      └── beach.jpg       # Shown in the listing instead of the original

Thumbnails are not generated; drop them in with the same file name.

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Gallery directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Listen address, overrides [server] bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// List the images the gallery would show
    Scan {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read every listed image and report the ones that are not decodable
    Check,
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("folio=info,tower_http=info")),
        )
        .init();

    match cli.command {
        Command::Serve { bind } => {
            let root = std::fs::canonicalize(&cli.root)?;
            let mut config = config::load_config(&root)?;
            if let Some(bind) = bind {
                config.server.bind = bind;
                config.validate()?;
            }
            let addr = config.bind_addr()?;
            let state = AppState::new(root, config);

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(state, addr))?;
        }
        Command::Scan { json } => {
            let root = std::fs::canonicalize(&cli.root)?;
            let config = config::load_config(&root)?;
            let entries = index::list(&root, &config.thumbnails.dir)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                let thumbnail_dir = config.thumbnail_path(&root);
                let selections: Vec<_> = entries
                    .iter()
                    .map(|entry| thumbnail::select(entry, &thumbnail_dir, &root))
                    .collect();
                output::print_scan_output(&entries, &selections, &root);
            }
        }
        Command::Check => {
            let root = std::fs::canonicalize(&cli.root)?;
            println!("==> Checking {}", root.display());
            let config = config::load_config(&root)?;
            let results: Vec<CheckResult> = index::list(&root, &config.thumbnails.dir)?
                .into_iter()
                .map(|entry| {
                    let meta = metadata::read(&entry.path_in(&root));
                    (entry, meta)
                })
                .collect();
            let failed = output::print_check_output(&results);
            if failed > 0 {
                return Err(format!("{failed} listed file(s) are not decodable images").into());
            }
            println!("==> Gallery is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
