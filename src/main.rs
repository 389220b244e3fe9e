//! Tessera - workspace lifecycle driver
//!
//! Loads the workspace manifest, attaches an audit handler to every phase and
//! walks through the requested workspace switches, printing one JSON report
//! per transition.

mod audit;

use anyhow::{anyhow, Context};
use audit::AuditHandler;
use std::path::PathBuf;
use tessera_core::config::{load_config, load_from_file};
use tessera_core::{
    LifecycleService, LifecycleServiceBuilder, Phase, Transition, Trigger, Workspace,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments
struct Args {
    /// Explicit config file
    config: Option<PathBuf>,
    /// Trigger used for the requested switches
    trigger: Trigger,
    /// Print workspace views instead of switching
    list: bool,
    /// Workspaces to activate, in order
    workspaces: Vec<String>,
}

impl Args {
    /// Parse command-line arguments
    fn parse() -> anyhow::Result<Self> {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut trigger = Trigger::Navigation;
        let mut list = false;
        let mut workspaces = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().context("--config needs a file")?;
                    config = Some(PathBuf::from(path));
                }
                "--trigger" | "-t" => {
                    let value = args.next().context("--trigger needs a value")?;
                    trigger = value.parse().map_err(|e: String| anyhow!(e))?;
                }
                "--list" | "-l" => list = true,
                _ if !arg.starts_with('-') => workspaces.push(arg),
                _ => {
                    // Ignore unknown flags
                }
            }
        }

        Ok(Self {
            config,
            trigger,
            list,
            workspaces,
        })
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_service(args: &Args) -> anyhow::Result<LifecycleService> {
    let config = match &args.config {
        Some(path) => load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => load_config(&std::env::current_dir()?)?,
    };

    let builder = LifecycleServiceBuilder::from_config_with(&config, with_audit)?;
    Ok(builder.build())
}

/// Attach the audit handler to every phase of `workspace`
fn with_audit(workspace: Workspace) -> Workspace {
    Phase::ALL
        .into_iter()
        .fold(workspace, |workspace, phase| workspace.on(phase, AuditHandler))
}

async fn print_report(transition: Transition) -> anyhow::Result<()> {
    let report = transition.settle().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse()?;
    init_tracing();
    tracing::debug!(core = tessera_core::version(), "tessera starting");

    let service = build_service(&args)?;

    if args.list {
        println!("{}", serde_json::to_string_pretty(&service.list_workspaces())?);
        return Ok(());
    }

    let initial = service
        .activate_default(Trigger::Programmatic)
        .await
        .context("no workspaces configured (see .tessera.toml)")?;
    print_report(initial).await?;

    for id in &args.workspaces {
        let transition = service.activate_workspace(id, args.trigger).await?;
        print_report(transition).await?;
    }

    for notification in service.notifications().try_iter() {
        tracing::debug!(?notification, "notification");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_audit_covers_every_phase() {
        let workspace = with_audit(Workspace::new("home", "Home"));
        for phase in Phase::ALL {
            assert_eq!(workspace.handlers(phase).len(), 1);
        }
    }

    #[test]
    fn test_core_version_is_set() {
        assert!(!tessera_core::version().is_empty());
    }
}
