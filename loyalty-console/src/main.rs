use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use loyalty_client::HttpClient;
use loyalty_console::storage::StoredSession;
use loyalty_console::{
    AppContext, BulkSelection, ConsoleConfig, ConsoleError, DashboardSummary, EarnStore,
    PointsStore, RedeemStore, SessionStore, init_logger,
};
use shared::error::AppError;

#[derive(Parser)]
#[command(name = "loyalty-console", version, about = "Loyalty program admin console")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Exchange a signed install payload for a session
    Login {
        #[arg(env = "LOYALTY_SIGNED_PAYLOAD")]
        signed_payload: String,
    },
    /// Refresh and list the store's sales channels
    Channels,
    /// Select the channel settings are scoped to
    SelectChannel { channel_id: u64 },
    /// Show the program overview for the selected channel
    Dashboard,
    /// Delete redeem coupons, honouring BULK_DELETE_POLICY
    DeleteCoupons {
        /// Coupon ids to delete
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        ids: Vec<String>,
        /// Delete every coupon of the selected channel
        #[arg(long)]
        all: bool,
    },
    /// Forget the stored session
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = ConsoleConfig::from_env()?;
    config.validate()?;
    let _log_guard = init_logger(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    if let Err(e) = run(cli.command, &config).await {
        let message = match e.downcast_ref::<ConsoleError>() {
            Some(console) => {
                let category = AppError::from(console).category();
                tracing::error!(error = %e, category = category.name(), "Command failed");
                console.toast_message()
            }
            None => {
                tracing::error!(error = %e, "Command failed");
                format!("{e:#}")
            }
        };
        eprintln!("{message}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &ConsoleConfig) -> anyhow::Result<()> {
    let storage = SessionStore::open(&config.data_dir)
        .with_context(|| format!("opening storage in {}", config.data_dir.display()))?;
    let mut ctx = AppContext::from_storage(storage);
    let mut client = config.client_config().build_http_client()?;

    match command {
        Command::Login { signed_payload } => {
            let login = client.login(&signed_payload).await.map_err(ConsoleError::from)?;
            ctx.login(&login)?;
            println!(
                "Logged in to {} ({} channels)",
                login.store.display_name(),
                login.channels.len()
            );
        }
        Command::Channels => {
            let session = require_session(&ctx)?;
            client.set_token(Some(session.session_token));
            let channels = client
                .channels(&session.store_id)
                .await
                .map_err(ConsoleError::from)?;
            ctx.set_channels(channels)?;

            let selected = ctx.selected_channel().map(|c| c.channel_id);
            for channel in ctx.channels() {
                let marker = if Some(channel.channel_id) == selected { "*" } else { " " };
                let synced = if channel.scope_id().is_some() { "" } else { " (not synced)" };
                println!(
                    "{marker} {:>6}  {}{synced}",
                    channel.channel_id,
                    channel.display_name()
                );
            }
        }
        Command::SelectChannel { channel_id } => {
            let channel = ctx.select_channel(channel_id)?;
            println!("Selected {}", channel.display_name());
        }
        Command::Dashboard => {
            let session = require_session(&ctx)?;
            client.set_token(Some(session.session_token));
            let scope = ctx.scope();
            if scope.resolved().is_none() {
                return Err(ConsoleError::MissingScope.into());
            }

            let mut points = PointsStore::new(config.base_path.clone());
            let mut earn = EarnStore::new();
            let mut redeem = RedeemStore::new();
            tokio::join!(
                points.load::<HttpClient>(&client, &scope),
                earn.load::<HttpClient>(&client, &scope),
                redeem.load::<HttpClient>(&client, &scope),
            );

            let summary = DashboardSummary::compute(
                points.settings(),
                earn.settings(),
                redeem.coupons(),
                Utc::now().date_naive(),
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::DeleteCoupons { ids, all } => {
            let session = require_session(&ctx)?;
            client.set_token(Some(session.session_token));
            let scope = ctx.scope();
            if scope.resolved().is_none() {
                return Err(ConsoleError::MissingScope.into());
            }

            let mut redeem = RedeemStore::new();
            redeem.load::<HttpClient>(&client, &scope).await;
            let selection = selection(ids, all);
            let outcome = redeem
                .bulk_delete::<HttpClient>(&client, &selection, config.bulk_delete_policy)
                .await?;

            if outcome.total() == 0 {
                println!("No matching coupons");
            } else {
                println!("Deleted {} of {} coupons", outcome.deleted.len(), outcome.total());
                for id in &outcome.failed_ids {
                    println!("  failed: {id}");
                }
            }
        }
        Command::Logout => {
            ctx.logout()?;
            println!("Logged out");
        }
    }
    Ok(())
}

fn selection(ids: Vec<String>, all: bool) -> BulkSelection {
    if all {
        BulkSelection::All
    } else {
        BulkSelection::Ids(ids)
    }
}

fn require_session(ctx: &AppContext) -> Result<StoredSession, ConsoleError> {
    ctx.storage()
        .session()
        .filter(|session| !session.is_expired(Utc::now()))
        .ok_or(ConsoleError::NotLoggedIn)
}
