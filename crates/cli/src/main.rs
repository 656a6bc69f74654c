use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use {
    async_trait::async_trait,
    clap::{Parser, Subcommand},
    herald_catalog::{Announcement, Catalog, CatalogService, ChannelKind},
    herald_command::{CommandHooks, CommandRateLimiter, CommandSource, HeraldCommand, RateLimitedCommand},
    herald_common::markup::strip_tags,
    herald_config::ConfigStore,
    herald_dispatch::{Dispatcher, WelcomeTracker},
    herald_engine::Engine,
    herald_proxy::{
        Actor, AllowAllPermissions, InMemoryDirectory, LogPresenter, ServerDirectory,
        StatusChangeFn, StatusMonitor,
    },
    herald_relay::{RelayHandle, RelayJob, RelayWorker},
    herald_streamers::{SimulatedProbe, StreamerService},
    tokio::io::{AsyncBufReadExt, BufReader},
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "herald", about = "Herald multi-server announcement broadcaster")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Custom data directory (overrides the platform default).
    #[arg(long, global = true, env = "HERALD_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the announcer until interrupted (default).
    Run,
    /// Validate the configuration and print a catalog summary.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn resolve_data_dir(cli: &Cli) -> PathBuf {
    if let Some(dir) = &cli.data_dir {
        return dir.clone();
    }
    directories::ProjectDirs::from("", "", "herald")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("herald-data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);
    let data_dir = resolve_data_dir(&cli);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(data_dir).await,
        Commands::Check => check(&data_dir),
    }
}

/// Full reload plus immediate sends, wired for the `/herald` command.
struct RuntimeHooks {
    config: Arc<ConfigStore>,
    catalog: Arc<CatalogService>,
    dispatcher: Arc<Dispatcher>,
    streamers: Arc<StreamerService>,
}

#[async_trait]
impl CommandHooks for RuntimeHooks {
    async fn reload(&self) {
        if let Err(e) = self.config.reload() {
            warn!(error = %e, "reload failed, keeping previous configuration");
            return;
        }
        self.dispatcher.clear_active_bars().await;
        self.catalog
            .replace(Catalog::load(&self.config.server_configs()));
        self.streamers.reload().await;
    }

    async fn send_now(&self, announcement: Arc<Announcement>) {
        self.dispatcher.send(&announcement, &[]).await;
    }
}

async fn run(data_dir: PathBuf) -> anyhow::Result<()> {
    info!(data_dir = %data_dir.display(), "starting herald");
    let config = Arc::new(ConfigStore::load(&data_dir)?);
    let main = config.main();

    let directory = Arc::new(InMemoryDirectory::new());
    for server in config.server_configs().keys() {
        directory.register(server.clone());
    }
    for server in directory.list_servers() {
        if let Err(e) = config.ensure_server(&server) {
            warn!(server, error = %e, "could not create server config files");
        }
    }

    let (relay, relay_rx) = RelayHandle::channel(64);
    let relay_worker = RelayWorker::spawn(reqwest::Client::new(), relay_rx);

    let permissions = Arc::new(AllowAllPermissions);
    let presenter = Arc::new(LogPresenter);
    let dispatcher = Dispatcher::new(
        directory.clone(),
        permissions.clone(),
        presenter.clone(),
        Some(relay.clone()),
        config.clone(),
    );

    let welcome = Arc::new(WelcomeTracker::new(config.clone(), presenter.clone()));
    {
        let on_join = Arc::clone(&welcome);
        let on_leave = Arc::clone(&welcome);
        directory.set_connection_hooks(
            Arc::new(move |server: &str, actor: &Actor| {
                let welcome = Arc::clone(&on_join);
                let server = server.to_owned();
                let actor = actor.clone();
                tokio::spawn(async move {
                    welcome.on_server_connected(&server, &actor).await;
                });
            }),
            Arc::new(move |actor_id| on_leave.on_disconnect(actor_id)),
        );
    }

    let status_webhook = main.webhooks.server_status_url.clone();
    let on_change: Option<StatusChangeFn> = if status_webhook.is_empty() {
        None
    } else {
        let relay = relay.clone();
        Some(Arc::new(move |server: &str, online: bool| {
            relay.enqueue(RelayJob::ServerStatus {
                url: status_webhook.clone(),
                server: server.to_owned(),
                online,
            });
        }))
    };
    let status = StatusMonitor::new(
        directory.clone(),
        main.servers.assume_all_online,
        main.servers.check_interval,
        on_change,
    );
    status.start().await;

    let catalog = Arc::new(CatalogService::new(
        Catalog::load(&config.server_configs()),
        config.clone(),
    ));

    let engine = Engine::new(
        catalog.clone(),
        dispatcher.clone(),
        status.clone(),
        directory.clone(),
        config.clone(),
    );
    engine.start().await;

    let streamers = StreamerService::new(
        config.clone(),
        directory.clone(),
        presenter,
        Some(relay.clone()),
        Box::new(SimulatedProbe::new(main.streamers.simulation.change_probability)),
    );
    streamers.start().await;

    let hooks = Arc::new(RuntimeHooks {
        config: config.clone(),
        catalog: catalog.clone(),
        dispatcher: dispatcher.clone(),
        streamers: streamers.clone(),
    });
    let limit = if main.commands.rate_limit {
        main.commands.max_per_minute
    } else {
        u32::MAX
    };
    let command = RateLimitedCommand::new(
        HeraldCommand::new(catalog, config.clone(), directory, permissions, hooks),
        CommandRateLimiter::new(limit),
    );

    console_loop(&command).await;

    info!("shutting down");
    engine.stop().await;
    streamers.stop().await;
    status.stop().await;
    dispatcher.clear_active_bars().await;
    // Every transitive RelayHandle clone must go before the drain: the
    // command holds one through its hooks, the status monitor through its
    // change callback.
    drop(command);
    drop(engine);
    drop(streamers);
    drop(status);
    drop(dispatcher);
    drop(relay);
    if tokio::time::timeout(Duration::from_secs(5), relay_worker.shutdown())
        .await
        .is_err()
    {
        warn!("relay worker did not drain in time");
    }
    Ok(())
}

/// Read console lines and run them as `/herald` invocations until ctrl-c.
async fn console_loop(command: &RateLimitedCommand) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "ctrl-c handler failed, exiting");
                }
                break;
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let args: Vec<&str> = line
                    .strip_prefix("herald")
                    .unwrap_or(line)
                    .split_whitespace()
                    .collect();
                for response in command.execute(&CommandSource::Console, &args).await {
                    println!("{}", strip_tags(&response));
                }
            }
        }
    }
}

fn check(data_dir: &Path) -> anyhow::Result<()> {
    let config = Arc::new(ConfigStore::load(data_dir)?);
    let catalog = Catalog::load(&config.server_configs());
    let main = config.main();

    println!("data dir: {}", data_dir.display());
    println!(
        "announcements: {} (engine {}, check every {}s)",
        catalog.len(),
        if main.announcements.enabled { "enabled" } else { "disabled" },
        main.announcements.check_frequency.max(1),
    );

    let mut servers = catalog.server_ids();
    servers.sort();
    for server in servers {
        let counts: Vec<String> = ChannelKind::ALL
            .into_iter()
            .map(|kind| format!("{kind}: {}", catalog.ids(&server, kind).len()))
            .collect();
        println!("  {server}: {}", counts.join(", "));
    }

    let scheduled = catalog.list_scheduled().len();
    println!("scheduled: {scheduled}");

    let streamer_count = config
        .streamers_tree()
        .get("streamers")
        .and_then(serde_yaml_mapping_len)
        .unwrap_or(0);
    println!(
        "streamers: {streamer_count} (checks {})",
        if main.streamers.enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn serde_yaml_mapping_len(value: &serde_yaml::Value) -> Option<usize> {
    value.as_mapping().map(serde_yaml::Mapping::len)
}
