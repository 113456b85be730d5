//! Notebook Image CLI - Bridge interface for notebook frontends
//!
//! Commands: render, render-array, normalize
//! Outputs JSON to stdout, logs to stderr (RUST_LOG)
//! Returns 1 on bad input, 2 on pipeline failure

use clap::{Parser, Subcommand};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use notebook_image::{
    Html, ImageError, ImageRenderer, ImageSource, Nested, NormalizedImage, Normalizer,
    RenderOptions, RendererConfig, VirtualFile,
};

#[derive(Parser)]
#[command(name = "notebook-image-cli")]
#[command(about = "Notebook Image CLI - render image-like values as HTML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to renderer config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inline bytes as data URLs instead of virtual files
    #[arg(long)]
    data_urls: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a path or URL
    Render {
        /// File path or URL
        #[arg(short, long)]
        src: String,

        /// JSON payload (RenderOptions)
        #[arg(short, long, default_value = "{}")]
        payload: String,
    },

    /// Render a nested numeric array
    RenderArray {
        /// JSON nested array, e.g. [[0,1],[2,3]]
        #[arg(short, long)]
        grid: String,

        /// JSON payload (RenderOptions)
        #[arg(short, long, default_value = "{}")]
        payload: String,
    },

    /// Normalize a nested numeric array and write the PNG
    Normalize {
        /// JSON nested array
        #[arg(short, long)]
        grid: String,

        /// Output PNG path
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match RendererConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                print_json(&serde_json::json!({"success": false, "error": e.to_string()}));
                return ExitCode::FAILURE;
            }
        },
        None => RendererConfig::default(),
    };
    if cli.data_urls {
        config.virtual_files = false;
    }

    match cli.command {
        Commands::Render { src, payload } => {
            let options = match parse_options(&payload) {
                Ok(o) => o,
                Err(code) => return code,
            };
            render(config, ImageSource::from(src), &options)
        }

        Commands::RenderArray { grid, payload } => {
            let grid = match parse_grid(&grid) {
                Ok(g) => g,
                Err(code) => return code,
            };
            let options = match parse_options(&payload) {
                Ok(o) => o,
                Err(code) => return code,
            };
            render(config, ImageSource::from(grid), &options)
        }

        Commands::Normalize { grid, out } => {
            let grid = match parse_grid(&grid) {
                Ok(g) => g,
                Err(code) => return code,
            };
            match write_normalized(grid, &out) {
                Ok(len) => {
                    print_json(&serde_json::json!({
                        "success": true,
                        "out": out,
                        "bytes": len,
                    }));
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e),
            }
        }
    }
}

fn render(config: RendererConfig, src: ImageSource, options: &RenderOptions) -> ExitCode {
    let mut renderer = ImageRenderer::from_config(config);
    let result = renderer.render(src, options);
    let files: Vec<VirtualFile> = renderer.store().files().into_iter().cloned().collect();
    emit(result, &files)
}

fn emit(result: Result<Html, ImageError>, files: &[VirtualFile]) -> ExitCode {
    match result {
        Ok(html) => {
            let listing: Vec<_> = files
                .iter()
                .map(|f| serde_json::json!({
                    "url": f.url,
                    "mimeType": f.mime_type,
                    "size": f.len(),
                }))
                .collect();
            print_json(&serde_json::json!({
                "success": true,
                "html": html,
                "files": listing,
            }));
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn write_normalized(grid: Nested, out: &Path) -> Result<usize, ImageError> {
    let mut bytes = vec![];
    match Normalizer::default().normalize(ImageSource::from(grid))? {
        NormalizedImage::Stream(mut stream) => {
            stream.read_to_end(&mut bytes)?;
        }
        other => {
            return Err(ImageError::UnsupportedType(other.kind().to_string()));
        }
    }
    fs::write(out, &bytes)?;
    Ok(bytes.len())
}

fn parse_options(payload: &str) -> Result<RenderOptions, ExitCode> {
    serde_json::from_str(payload).map_err(|e| {
        print_json(&serde_json::json!({"success": false, "error": format!("Invalid payload: {}", e)}));
        ExitCode::FAILURE
    })
}

fn parse_grid(grid: &str) -> Result<Nested, ExitCode> {
    serde_json::from_str(grid).map_err(|e| {
        print_json(&serde_json::json!({"success": false, "error": format!("Invalid grid: {}", e)}));
        ExitCode::FAILURE
    })
}

fn fail(e: ImageError) -> ExitCode {
    log::error!("{}", e);
    print_json(&serde_json::json!({"success": false, "error": e.to_string()}));
    ExitCode::from(2)
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap());
}
