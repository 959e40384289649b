// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube::Client;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use k8s_chaos_provider::config::Config;
use k8s_chaos_provider::kubernetes::{create_client, parse_import_id, ResourceHandler};
use k8s_chaos_provider::manifest::{render_manifest, ResourceConfig};
use k8s_chaos_provider::types::{ChaosKind, PodChaos};
use k8s_chaos_provider::wait::Poller;

#[derive(Parser)]
#[command(version, about = "Manage chaos engineering custom resources and wait for their conditions")]
struct Cli {
    /// Kubeconfig file; inferred from the environment when omitted
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or update the resource in a configuration file, then run its upsert waits
    Apply {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Show a resource, identified as namespace/name (or name when cluster scoped)
    Read { kind: ChaosKind, id: String },
    /// Delete the resource in a configuration file, then run its delete wait
    Delete {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print an existing resource as a manifest ready to be managed
    Import { kind: ChaosKind, id: String },
    /// Render the manifest of a configuration file without contacting the cluster
    Manifest {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// List the supported kinds
    Kinds,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Manifest { file } => {
            let resource = load_resource(&file).await?;
            let (_, object) = resource.desired_object(&config.default_namespace)?;
            print!("{}", render_manifest(&object)?);
        }
        Command::Kinds => {
            for kind in ChaosKind::ALL {
                println!("{:<22} {:<25} {}", kind.kind(), kind.api_version(), kind.plural());
            }
        }
        Command::Apply { file } => {
            let resource = load_resource(&file).await?;
            let (kind, desired) = resource.desired_object(&config.default_namespace)?;
            let waits = resource.upsert_waits()?;
            let client = connect(cli.kubeconfig.as_deref(), cli.context.as_deref()).await?;
            let handler = ResourceHandler::new(client, kind, &config).with_poller(cancellable_poller());

            let name = desired.metadata.name.clone().unwrap_or_default();
            let existing = handler
                .read(desired.metadata.namespace.as_deref(), &name)
                .await?;
            let applied = match existing {
                Some(_) => handler.update(&desired, &waits).await?,
                None => handler.create(&desired, &waits).await?,
            };
            info!("Wait outcomes: {:?}", applied.waits);
            print!("{}", render_manifest(&applied.object)?);
        }
        Command::Read { kind, id } => {
            let (namespace, name) = parse_import_id(&id, kind.is_namespaced())?;
            let client = connect(cli.kubeconfig.as_deref(), cli.context.as_deref()).await?;
            let handler = ResourceHandler::new(client, kind, &config);

            match handler.read(namespace.as_deref(), &name).await? {
                Some(object) => {
                    if kind == ChaosKind::PodChaos {
                        match serde_json::to_value(&object).and_then(serde_json::from_value::<PodChaos>) {
                            Ok(typed) => info!("{}", typed.summary()),
                            Err(e) => debug!("Could not read PodChaos status: {}", e),
                        }
                    }
                    print!("{}", serde_yaml::to_string(&object)?);
                }
                None => warn!("{} {} does not exist", kind, id),
            }
        }
        Command::Delete { file } => {
            let resource = load_resource(&file).await?;
            let (kind, desired) = resource.desired_object(&config.default_namespace)?;
            let wait = resource.delete_wait()?;
            let client = connect(cli.kubeconfig.as_deref(), cli.context.as_deref()).await?;
            let handler = ResourceHandler::new(client, kind, &config).with_poller(cancellable_poller());

            let name = desired.metadata.name.clone().unwrap_or_default();
            let outcome = handler
                .delete(desired.metadata.namespace.as_deref(), &name, wait.as_ref())
                .await?;
            info!("Wait outcome: {:?}", outcome);
        }
        Command::Import { kind, id } => {
            let client = connect(cli.kubeconfig.as_deref(), cli.context.as_deref()).await?;
            let handler = ResourceHandler::new(client, kind, &config);
            let object = handler.import(&id).await?;
            print!("{}", render_manifest(&object)?);
        }
    }

    Ok(())
}

async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let client = create_client(kubeconfig, context).await?;
    info!("Connected to Kubernetes cluster");
    Ok(client)
}

/// Poller whose waits are aborted by Ctrl-C; the mutation before the wait is kept
fn cancellable_poller() -> Poller {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling wait");
            on_signal.cancel();
        }
    });
    Poller::new(cancel)
}

async fn load_resource(path: &Path) -> Result<ResourceConfig> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    ResourceConfig::from_yaml(&text).with_context(|| format!("Invalid configuration in {}", path.display()))
}
