use clap::{Parser, Subcommand};
use photo_tone::{Adjustment, Preset, Settings, Unstoppable};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use photoglow::api;
use photoglow::models::{AppConfig, DEFAULT_CONFIG_YAML};
use photoglow::server;
use photoglow::services::{clamp_user_settings, enhancer, output_filename, EnhanceRequest};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Parser)]
#[command(name = "photoglow")]
#[command(about = "One-click photo enhancement: tone, warmth, clarity and fade")]
struct Cli {
    /// Configuration file (overrides CONFIG_FILE)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance an image file and write the result as PNG
    Enhance {
        /// Input image (PNG, JPEG, GIF, BMP or WebP)
        input: PathBuf,

        /// Output PNG path (default: <input>-enhanced.png next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Starting preset: default, auto or neutral
        #[arg(short, long)]
        preset: Option<Preset>,

        /// Brightness offset (-40..60)
        #[arg(long, allow_negative_numbers = true)]
        brightness: Option<f64>,

        /// Contrast amount (-30..60)
        #[arg(long, allow_negative_numbers = true)]
        contrast: Option<f64>,

        /// Saturation amount (-20..50)
        #[arg(long, allow_negative_numbers = true)]
        saturation: Option<f64>,

        /// Warm/cool shift (-15..25)
        #[arg(long, allow_negative_numbers = true)]
        warmth: Option<f64>,

        /// Local contrast (0..60)
        #[arg(long, allow_negative_numbers = true)]
        clarity: Option<f64>,

        /// Lift towards white (0..40)
        #[arg(long, allow_negative_numbers = true)]
        fade: Option<f64>,

        /// Longest side after decoding (overrides config)
        #[arg(long)]
        max_dimension: Option<u32>,

        /// Re-compress the PNG with oxipng
        #[arg(long)]
        optimize: bool,
    },
    /// Start the HTTP server
    Serve,
    /// Print presets and slider ranges
    Presets,
    /// Write the default config.yaml
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "photoglow API",
        description = "One-click photo enhancement",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(api::handle_enhance, api::handle_presets),
    components(schemas(api::PresetsResponse, api::SettingsBody, api::RangeBody)),
    tags(
        (name = "Enhance", description = "Photo enhancement and presets")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from));

    match cli.command {
        Some(Commands::Enhance {
            input,
            output,
            preset,
            brightness,
            contrast,
            saturation,
            warmth,
            clarity,
            fade,
            max_dimension,
            optimize,
        }) => {
            let overrides = [
                (Adjustment::Brightness, brightness),
                (Adjustment::Contrast, contrast),
                (Adjustment::Saturation, saturation),
                (Adjustment::Warmth, warmth),
                (Adjustment::Clarity, clarity),
                (Adjustment::Fade, fade),
            ];
            run_enhance_command(
                config_path.as_deref(),
                &input,
                output.as_deref(),
                preset,
                &overrides,
                max_dimension,
                optimize,
            )
        }
        Some(Commands::Serve) => run_server(config_path.as_deref()).await,
        Some(Commands::Presets) => {
            init_cli_logging();
            run_presets_command(&AppConfig::load(config_path.as_deref()));
            Ok(())
        }
        Some(Commands::Init { force }) => run_init_command(config_path.as_deref(), force),
        None => {
            run_status_command(config_path.as_deref());
            Ok(())
        }
    }
}

/// Minimal logging for CLI commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photoglow=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Enhance a file directly (no server needed)
fn run_enhance_command(
    config_path: Option<&Path>,
    input: &Path,
    output: Option<&Path>,
    preset: Option<Preset>,
    overrides: &[(Adjustment, Option<f64>)],
    max_dimension: Option<u32>,
    optimize: bool,
) -> anyhow::Result<()> {
    init_cli_logging();

    let mut config = AppConfig::load(config_path);
    if let Some(max) = max_dimension.filter(|&m| m > 0) {
        config.max_dimension = max;
    }
    config.optimize_png |= optimize;

    let base = match preset {
        None | Some(Preset::Default) => config.defaults,
        Some(preset) => preset.settings(),
    };
    let settings = overrides
        .iter()
        .filter_map(|&(adjustment, value)| value.map(|v| (adjustment, v)))
        .fold(base, |settings: Settings, (adjustment, value)| {
            settings.with(adjustment, value)
        });
    let settings = clamp_user_settings(settings);

    let input_name = input.file_name().map(|n| n.to_string_lossy().into_owned());
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(
            input,
            &output_filename(input_name.as_deref(), &config.output_suffix),
        )?,
    };

    let bytes = std::fs::read(input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;

    let result = enhancer::process(
        &config,
        &EnhanceRequest {
            bytes,
            settings,
            filename: input_name,
        },
        &Unstoppable,
    )?;

    std::fs::write(&output, &result.png_bytes)?;
    println!(
        "Enhanced {} -> {} ({}x{}, {} bytes)",
        input.display(),
        output.display(),
        result.width,
        result.height,
        result.png_bytes.len()
    );

    Ok(())
}

/// Output path next to `input`, refusing to replace the input itself.
fn default_output_path(input: &Path, filename: &str) -> anyhow::Result<PathBuf> {
    let output = input.with_file_name(filename);
    if output == input {
        anyhow::bail!(
            "Refusing to overwrite {}; pass -o or set a non-empty output_suffix",
            input.display()
        );
    }
    Ok(output)
}

/// Print presets and suggested slider ranges
fn run_presets_command(config: &AppConfig) {
    println!("Presets:");
    for preset in Preset::ALL {
        let settings = match preset {
            Preset::Default => config.defaults,
            other => other.settings(),
        };
        print!("  {:<8}", preset.name());
        for adjustment in Adjustment::ALL {
            print!(" {}={}", adjustment.name(), settings.get(adjustment));
        }
        println!();
    }

    println!("\nSlider ranges:");
    for adjustment in Adjustment::ALL {
        let range = adjustment.range();
        println!(
            "  {:<11} {:>4} .. {:<4} (default {})",
            adjustment.name(),
            range.start(),
            range.end(),
            adjustment.default_value()
        );
    }
}

/// Write the embedded default configuration
fn run_init_command(config_path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = config_path.unwrap_or(Path::new("config.yaml"));

    if path.exists() && !force {
        println!(
            "Skipped {} (already exists, use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG_YAML)?;
    println!("Wrote {}", path.display());

    Ok(())
}

/// Display status and configuration information
fn run_status_command(config_path: Option<&Path>) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();

    println!("photoglow v{VERSION}");
    println!("One-click photo enhancement\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );

    let config_source = match config_path {
        Some(p) if p.exists() => p.display().to_string(),
        Some(_) => "built-in defaults (file not found)".to_string(),
        None => "built-in defaults".to_string(),
    };
    println!("\nConfig: {config_source}");

    println!("\nCommands:");
    println!("  photoglow enhance   Enhance an image file");
    println!("  photoglow serve     Start the HTTP server");
    println!("  photoglow presets   Show presets and slider ranges");
    println!("  photoglow init      Write the default config.yaml");
    println!("\nRun 'photoglow --help' for more details.");
}

/// Run the HTTP server
async fn run_server(config_path: Option<&Path>) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photoglow=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let config = AppConfig::load(config_path);

    tracing::info!(
        config = ?config_path.map(|p| p.display().to_string()).unwrap_or_else(|| "built-in".to_string()),
        max_dimension = config.max_dimension,
        max_upload_bytes = config.max_upload_bytes,
        "Configuration ready"
    );

    let state = server::create_app_state(config);

    // Build router: start with shared API routes, add production-only routes
    let app = server::build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "photoglow server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
