use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use posting_scraper::app::admin_use_case::AdminUseCase;
use posting_scraper::app::context::AppContext;
use posting_scraper::app::sweep_use_case::SweepUseCase;
use posting_scraper::common::constants::DEFAULT_CONFIG_PATH;
use posting_scraper::config::Config;
use posting_scraper::domain::PostingFilter;
use posting_scraper::infra::http_client::ReqwestHttp;
use posting_scraper::infra::mail::mail_sender_from_config;
use posting_scraper::ingest::IngestPipeline;
use posting_scraper::storage::{PostingStore, SqliteStorage};
use posting_scraper::{logging, metrics};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "posting_scraper")]
#[command(about = "Harvests postings and contact emails from site feeds")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every site's feed and store new postings
    Ingest,
    /// Delete postings past the retention window
    Sweep,
    /// Manage the sites whose feeds are polled
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },
    /// Review and act on stored postings
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum SiteAction {
    /// Register a feed URL
    Add { domain: String },
    /// List registered sites
    List,
    /// Remove a site and its postings
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List postings
    List {
        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        site: Option<i64>,
        /// Only postings created on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,
    },
    /// Mark postings active
    Activate {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Mark postings inactive
    Deactivate {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Send the configured reply to each posting's contact and mark them active
    Email {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    logging::init_logging(&config.logging.dir);
    metrics::init_metrics();

    let store: Arc<dyn PostingStore> = Arc::new(
        SqliteStorage::open(&config.database.path)
            .with_context(|| format!("opening {}", config.database.path.display()))?,
    );
    let ctx = AppContext::new(
        config,
        store,
        Arc::new(ReqwestHttp::new()),
        Local::now().date_naive(),
    );

    match cli.command {
        Commands::Ingest => {
            let report = IngestPipeline::new(&ctx).run().await?;
            info!(
                sites = report.sites,
                created = report.created,
                errors = report.errors.len(),
                "Ingest complete"
            );
        }
        Commands::Sweep => {
            let sweeper = SweepUseCase::new(ctx.store.as_ref(), &ctx.config.sweeper);
            sweeper.run(ctx.today, &mut std::io::stdout()).await?;
        }
        Commands::Site { action } => run_site_action(&ctx, action).await?,
        Commands::Admin { action } => run_admin_action(&ctx, action).await?,
    }

    if let Some(path) = &ctx.config.metrics.textfile {
        if let Err(e) = metrics::write_textfile(path) {
            warn!("Failed to write metrics to {}: {}", path.display(), e);
        }
    }
    Ok(())
}

async fn run_site_action(ctx: &AppContext, action: SiteAction) -> anyhow::Result<()> {
    match action {
        SiteAction::Add { domain } => {
            let site = ctx.store.add_site(domain.trim()).await?;
            println!("{}\t{}", site.id, site.domain);
        }
        SiteAction::List => {
            for site in ctx.store.list_sites().await? {
                println!("{}\t{}", site.id, site.domain);
            }
        }
        SiteAction::Remove { id } => {
            if ctx.store.remove_site(id).await? {
                println!("Removed site {}", id);
            } else {
                println!("No site with id {}", id);
            }
        }
    }
    Ok(())
}

async fn run_admin_action(ctx: &AppContext, action: AdminAction) -> anyhow::Result<()> {
    let admin = AdminUseCase::new(ctx.store.as_ref());
    match action {
        AdminAction::List {
            search,
            active,
            site,
            since,
        } => {
            let filter = PostingFilter {
                search,
                active,
                site_id: site,
                created_since: since,
            };
            for p in admin.list(&filter).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    p.id,
                    p.title,
                    p.email.as_deref().unwrap_or("-"),
                    p.active
                );
            }
        }
        AdminAction::Activate { ids } => println!("{}", admin.set_active(&ids, true).await?),
        AdminAction::Deactivate { ids } => println!("{}", admin.set_active(&ids, false).await?),
        AdminAction::Email { ids } => {
            let mailer = mail_sender_from_config(&ctx.config.mail);
            let report = admin
                .email_users(&ids, mailer.as_ref(), &ctx.config.mail)
                .await?;
            if report.skipped_no_email > 0 || report.failed > 0 {
                warn!(
                    skipped = report.skipped_no_email,
                    failed = report.failed,
                    "Some postings were not mailed"
                );
            }
            println!("{}", report.message());
        }
    }
    Ok(())
}
