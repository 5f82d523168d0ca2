//! site-exporter CLI
//!
//! Renders every locale and route of a running site into a static tree.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use site_exporter::{
    error::Result,
    models::{Config, EnvOverrides, Route},
    pipeline::{self, ExportContext, ExportOptions},
    services::{self, BasePathRewriter, HttpPageFetcher, ManifestRouteSource, RouteSource},
    storage::{LocalStorage, relative_output_path},
};

/// Static exporter for a multi-locale site
#[derive(Parser, Debug)]
#[command(
    name = "site-exporter",
    version,
    about = "Export a dynamic multi-locale site to static files"
)]
struct Cli {
    /// Path to the exporter configuration file
    #[arg(short, long, default_value = "export.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export all locales, routes and assets
    Export {
        /// Base URL of the dynamic server (overrides server.base_url)
        #[arg(long)]
        base_url: Option<String>,

        /// Export root directory (overrides export.output_dir, relative to export.content_root)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not start server.command; expect a server at the base URL
        #[arg(long)]
        no_spawn: bool,
    },

    /// List the pages an export would write, without fetching anything
    Plan,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply_overrides(EnvOverrides::from_env());

    match cli.command {
        Command::Export {
            base_url,
            output,
            no_spawn,
        } => {
            if let Some(base_url) = base_url {
                config.server.base_url = base_url;
            }
            if let Some(output) = output {
                config.export.output_dir = output;
            }
            config.validate()?;
            export(&config, !no_spawn).await?;
        }

        Command::Plan => {
            config.validate()?;
            plan(&config).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            let manifest = ManifestRouteSource::from_config(&config)?.load().await?;
            log::info!(
                "✓ Config OK ({} locale(s), {} fixed route(s))",
                manifest.cultures.len(),
                manifest.paths.len()
            );
        }
    }

    Ok(())
}

async fn export(config: &Config, spawn: bool) -> Result<()> {
    let routes = ManifestRouteSource::from_config(config)?;
    let content = services::open_content_store(config).await?;
    let fetcher = HttpPageFetcher::from_config(&config.http)?;
    let rewriter = BasePathRewriter::from_config(config);
    let storage = LocalStorage::new(config.output_dir());

    if rewriter.base_path().is_empty() {
        log::info!("Base path: (none)");
    } else {
        log::info!("Base path: {}", rewriter.base_path());
    }

    let ctx = ExportContext {
        routes: &routes,
        content: content.as_ref(),
        fetcher: &fetcher,
        rewriter: &rewriter,
        storage: &storage,
        options: ExportOptions::from_config(config)?,
    };

    let server = services::server::from_config(&config.server, spawn);
    let report = pipeline::run_hosted(&ctx, server.as_ref()).await?;
    log::info!(
        "Static export -> {} (root redirects to ./{}/)",
        storage.root().display(),
        report.default_locale
    );
    Ok(())
}

async fn plan(config: &Config) -> Result<()> {
    let manifest = ManifestRouteSource::from_config(config)?.load().await?;
    let content = services::open_content_store(config).await?;
    let detail_prefix = Route::parse(config.content.detail_prefix.as_str())?;

    let mut total = 0;
    for locale in &manifest.cultures {
        let slugs = content.slugs_for(locale).await?;
        let targets = pipeline::plan_locale(locale, &manifest.paths, &slugs, &detail_prefix)?;
        for target in &targets {
            log::info!(
                "{} {} -> {}",
                target.locale,
                target.route,
                relative_output_path(&target.locale, &target.route)?.display()
            );
        }
        total += targets.len();
    }

    log::info!(
        "{} page(s) across {} locale(s)",
        total,
        manifest.cultures.len()
    );
    Ok(())
}
