mod config;
mod plan;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;

use pdconfig_core::diagnostics::{Diagnostics, Severity};
use pdconfig_core::provider::Provider;
use pdconfig_core::resource::{
    CreateRequest, DeleteRequest, ImportStateRequest, ReadRequest, Resource, ResourceId,
    UpdateRequest,
};
use pdconfig_core::value::{AttributeMap, Value};
use pdconfig_provider::resources::all_schemas;
use pdconfig_provider::resources::generate_server_profile_recurring_task::TYPE_NAME;
use pdconfig_provider::{PingDirectoryProvider, ProviderConfig};
use pdconfig_state::{LocalBackend, ResourceState, StateBackend, StateFile};

use crate::config::{ConfigFile, ResourceConfig};
use crate::plan::{changed_attributes, plan_attributes};

#[derive(Parser)]
#[command(name = "pdconfig")]
#[command(about = "Manage directory server configuration objects", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the provider block and `PINGDIRECTORY_PROVIDER_*` variables
#[derive(clap::Args)]
struct ConnectionArgs {
    /// Server URL, e.g. https://localhost:1443
    #[arg(long, global = true)]
    host: Option<String>,

    #[arg(long, global = true)]
    username: Option<String>,

    #[arg(long, global = true)]
    password: Option<String>,

    /// Trust any server certificate
    #[arg(long, global = true)]
    insecure: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print resource schemas as JSON
    Schema,
    /// Validate a configuration file against the resource schemas
    Validate {
        #[arg(default_value = "pdconfig.json")]
        file: PathBuf,
    },
    /// Create or update the configured resources
    Apply {
        #[arg(default_value = "pdconfig.json")]
        file: PathBuf,

        #[arg(long, default_value = LocalBackend::DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Re-read every resource in the state file from the server
    Refresh {
        /// Configuration file supplying the provider block
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = LocalBackend::DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Delete every resource in the state file
    Destroy {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = LocalBackend::DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
    /// Start managing an existing object
    Import {
        /// Name of the object on the server
        id: String,

        #[arg(long = "type", default_value = TYPE_NAME)]
        resource_type: String,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = LocalBackend::DEFAULT_STATE_FILE)]
        state: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let connection = cli.connection;

    let result = match cli.command {
        Commands::Schema => run_schema(),
        Commands::Validate { file } => run_validate(&file),
        Commands::Apply { file, state } => run_apply(&connection, &file, &state).await,
        Commands::Refresh { config, state } => {
            run_refresh(&connection, config.as_deref(), &state).await
        }
        Commands::Destroy { config, state } => {
            run_destroy(&connection, config.as_deref(), &state).await
        }
        Commands::Import {
            id,
            resource_type,
            config,
            state,
        } => run_import(&connection, &resource_type, &id, config.as_deref(), &state).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_schema() -> Result<(), String> {
    let schemas: serde_json::Map<String, serde_json::Value> = all_schemas()
        .iter()
        .map(|schema| (schema.resource_type.clone(), schema.to_json()))
        .collect();
    let output = serde_json::to_string_pretty(&schemas).map_err(|e| e.to_string())?;
    println!("{}", output);
    Ok(())
}

fn run_validate(file: &Path) -> Result<(), String> {
    let config = ConfigFile::load(file)?;
    validate_resources(&config.resources)?;
    println!("{}", "Configuration is valid.".green());
    Ok(())
}

fn validate_resources(resources: &[ResourceConfig]) -> Result<(), String> {
    let schemas = all_schemas();
    let mut all_errors = Vec::new();

    for resource in resources {
        let id = resource.id()?;
        let Some(schema) = schemas
            .iter()
            .find(|s| s.resource_type == resource.resource_type)
        else {
            all_errors.push(format!("{}: unknown resource type", id));
            continue;
        };
        let attributes = match resource.attributes() {
            Ok(attributes) => attributes,
            Err(e) => {
                all_errors.push(e);
                continue;
            }
        };
        if let Err(errors) = schema.validate(&attributes) {
            let mut messages: Vec<String> =
                errors.iter().map(|e| format!("{}: {}", id, e)).collect();
            messages.sort();
            all_errors.extend(messages);
        }
    }

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors.join("\n"))
    }
}

fn build_provider(
    connection: &ConnectionArgs,
    config: Option<&ConfigFile>,
) -> Result<PingDirectoryProvider, String> {
    let mut attributes = config
        .map(ConfigFile::provider_attributes)
        .transpose()?
        .unwrap_or_default();
    if let Some(host) = &connection.host {
        attributes.insert("https_host".to_string(), Value::from(host.as_str()));
    }
    if let Some(username) = &connection.username {
        attributes.insert("username".to_string(), Value::from(username.as_str()));
    }
    if let Some(password) = &connection.password {
        attributes.insert("password".to_string(), Value::from(password.as_str()));
    }
    if connection.insecure {
        attributes.insert("insecure_trust_all_tls".to_string(), Value::Bool(true));
    }

    let provider_config = ProviderConfig::from_attributes(&attributes).map_err(|e| e.to_string())?;
    log::debug!("Provider configuration: {:?}", provider_config);
    PingDirectoryProvider::new(&provider_config).map_err(|e| e.to_string())
}

fn load_optional_config(path: Option<&Path>) -> Result<Option<ConfigFile>, String> {
    path.map(ConfigFile::load).transpose()
}

fn lookup_resource(
    provider: &PingDirectoryProvider,
    resource_type: &str,
) -> Result<Arc<dyn Resource>, String> {
    provider
        .resource(resource_type)
        .ok_or_else(|| format!("Unknown resource type: {}", resource_type))
}

/// Print diagnostics; true when any of them is an error
fn print_diagnostics(id: &ResourceId, diagnostics: &Diagnostics) -> bool {
    for diagnostic in diagnostics.iter() {
        let label = match diagnostic.severity {
            Severity::Error => "Error:".red().bold(),
            Severity::Warning => "Warning:".yellow().bold(),
        };
        match &diagnostic.attribute {
            Some(attribute) => println!(
                "    {} {} ({}.{})",
                label, diagnostic.summary, id, attribute
            ),
            None => println!("    {} {} ({})", label, diagnostic.summary, id),
        }
        for line in diagnostic.detail.lines() {
            println!("      {}", line.dimmed());
        }
    }
    diagnostics.has_error()
}

fn store(state: &mut StateFile, id: &ResourceId, attributes: &AttributeMap) -> Result<(), String> {
    let resource = ResourceState::from_attributes(id, attributes)
        .ok_or_else(|| format!("{}: state still contains unknown values", id))?;
    state.upsert_resource(resource);
    Ok(())
}

/// Run `action` against the state file while holding its lock
async fn with_locked_state<F, Fut>(state_path: &Path, operation: &str, action: F) -> Result<(), String>
where
    F: FnOnce(StateFile) -> Fut,
    Fut: Future<Output = (StateFile, Result<(), String>)>,
{
    let backend = LocalBackend::with_path(state_path);
    let lock = backend
        .acquire_lock(operation)
        .await
        .map_err(|e| e.to_string())?;

    let outcome = update_state(&backend, action).await;

    if let Err(e) = backend.release_lock(&lock).await {
        log::warn!("Failed to release state lock: {}", e);
    }
    outcome
}

/// Read, modify and persist the state; the state is written even when `action` fails
async fn update_state<F, Fut>(backend: &LocalBackend, action: F) -> Result<(), String>
where
    F: FnOnce(StateFile) -> Fut,
    Fut: Future<Output = (StateFile, Result<(), String>)>,
{
    let state = backend
        .read_state()
        .await
        .map_err(|e| e.to_string())?
        .unwrap_or_default();
    let (mut state, result) = action(state).await;
    state.increment_serial();
    backend
        .write_state(&state)
        .await
        .map_err(|e| e.to_string())?;
    result
}

fn summarize(success_count: usize, failure_count: usize) -> Result<(), String> {
    println!();
    if failure_count == 0 {
        println!(
            "{}",
            format!("Complete! {} resource(s) processed.", success_count)
                .green()
                .bold()
        );
        Ok(())
    } else {
        Err(format!(
            "{} succeeded, {} failed",
            success_count, failure_count
        ))
    }
}

async fn run_apply(connection: &ConnectionArgs, file: &Path, state_path: &Path) -> Result<(), String> {
    let config = ConfigFile::load(file)?;
    validate_resources(&config.resources)?;
    let provider = build_provider(connection, Some(&config))?;

    with_locked_state(state_path, "apply", |mut state| async move {
        let result = apply_resources(&provider, &config.resources, &mut state).await;
        (state, result)
    })
    .await
}

async fn apply_resources(
    provider: &PingDirectoryProvider,
    resources: &[ResourceConfig],
    state: &mut StateFile,
) -> Result<(), String> {
    println!("{}", "Applying changes...".cyan().bold());
    let mut success_count = 0;
    let mut failure_count = 0;

    for resource_config in resources {
        let id = resource_config.id()?;
        let resource = lookup_resource(provider, &id.resource_type)?;
        let schema = resource.schema();
        let configured = resource_config.attributes()?;

        let prior = state
            .find_resource(&id)
            .map(ResourceState::to_attributes)
            .transpose()
            .map_err(|e| e.to_string())?;
        let applied = match prior {
            None => {
                let plan = plan_attributes(&schema, &configured, None);
                let response = resource.create(CreateRequest { plan }).await;
                print_diagnostics(&id, &response.diagnostics);
                response.state.map(|s| ("create", s))
            }
            Some(prior) => {
                let refreshed = resource.read(ReadRequest { state: prior }).await;
                print_diagnostics(&id, &refreshed.diagnostics);
                match refreshed.state {
                    None => None,
                    Some(current) => {
                        let plan = plan_attributes(&schema, &configured, Some(&current));
                        let changed = changed_attributes(&plan, &current);
                        if changed.is_empty() {
                            Some(("unchanged", current))
                        } else {
                            log::info!("{}: updating {}", id, changed.join(", "));
                            let response = resource
                                .update(UpdateRequest {
                                    plan,
                                    prior_state: current,
                                })
                                .await;
                            print_diagnostics(&id, &response.diagnostics);
                            response.state.map(|s| ("update", s))
                        }
                    }
                }
            }
        };

        match applied {
            Some((action, attributes)) => {
                store(state, &id, &attributes)?;
                println!("  {} {} {}", "✓".green(), action, id);
                success_count += 1;
            }
            None => {
                println!("  {} {}", "✗".red(), id);
                failure_count += 1;
            }
        }
    }

    let configured: Vec<ResourceId> = resources.iter().filter_map(|r| r.id().ok()).collect();
    for orphan in state.resources.iter().map(ResourceState::id) {
        if !configured.contains(&orphan) {
            println!(
                "  {} {} is no longer configured; run destroy to delete it",
                "!".yellow(),
                orphan
            );
        }
    }

    summarize(success_count, failure_count)
}

async fn run_refresh(
    connection: &ConnectionArgs,
    config: Option<&Path>,
    state_path: &Path,
) -> Result<(), String> {
    let config = load_optional_config(config)?;
    let provider = build_provider(connection, config.as_ref())?;

    with_locked_state(state_path, "refresh", |mut state| async move {
        let mut success_count = 0;
        let mut failure_count = 0;
        for entry in state.resources.clone() {
            let id = entry.id();
            let resource = match lookup_resource(&provider, &id.resource_type) {
                Ok(resource) => resource,
                Err(e) => return (state, Err(e)),
            };
            let attributes = match entry.to_attributes() {
                Ok(attributes) => attributes,
                Err(e) => return (state, Err(e.to_string())),
            };
            let response = resource.read(ReadRequest { state: attributes }).await;
            print_diagnostics(&id, &response.diagnostics);
            match response.state {
                Some(attributes) => {
                    if let Err(e) = store(&mut state, &id, &attributes) {
                        return (state, Err(e));
                    }
                    println!("  {} refreshed {}", "✓".green(), id);
                    success_count += 1;
                }
                None => {
                    println!("  {} {}", "✗".red(), id);
                    failure_count += 1;
                }
            }
        }
        let result = summarize(success_count, failure_count);
        (state, result)
    })
    .await
}

async fn run_destroy(
    connection: &ConnectionArgs,
    config: Option<&Path>,
    state_path: &Path,
) -> Result<(), String> {
    let config = load_optional_config(config)?;
    let provider = build_provider(connection, config.as_ref())?;

    with_locked_state(state_path, "destroy", |mut state| async move {
        let mut success_count = 0;
        let mut failure_count = 0;
        for entry in state.resources.clone() {
            let id = entry.id();
            let resource = match lookup_resource(&provider, &id.resource_type) {
                Ok(resource) => resource,
                Err(e) => return (state, Err(e)),
            };
            let attributes = match entry.to_attributes() {
                Ok(attributes) => attributes,
                Err(e) => return (state, Err(e.to_string())),
            };
            let response = resource.delete(DeleteRequest { state: attributes }).await;
            if print_diagnostics(&id, &response.diagnostics) {
                println!("  {} {}", "✗".red(), id);
                failure_count += 1;
            } else {
                state.remove_resource(&id);
                println!("  {} deleted {}", "✓".green(), id);
                success_count += 1;
            }
        }
        let result = summarize(success_count, failure_count);
        (state, result)
    })
    .await
}

async fn run_import(
    connection: &ConnectionArgs,
    resource_type: &str,
    name: &str,
    config: Option<&Path>,
    state_path: &Path,
) -> Result<(), String> {
    let config = load_optional_config(config)?;
    let provider = build_provider(connection, config.as_ref())?;
    let resource = lookup_resource(&provider, resource_type)?;
    let id = ResourceId::new(resource_type, name);

    with_locked_state(state_path, "import", |mut state| async move {
        if state.find_resource(&id).is_some() {
            return (state, Err(format!("{} is already managed", id)));
        }

        let imported = resource.import_state(ImportStateRequest {
            id: name.to_string(),
        });
        if print_diagnostics(&id, &imported.diagnostics) {
            return (state, Err(format!("Failed to import {}", id)));
        }
        let Some(imported) = imported.state else {
            return (state, Err(format!("Failed to import {}", id)));
        };

        let response = resource.read(ReadRequest { state: imported }).await;
        print_diagnostics(&id, &response.diagnostics);
        let result = match response.state {
            Some(attributes) => store(&mut state, &id, &attributes).map(|()| {
                println!("  {} imported {}", "✓".green(), id);
            }),
            None => Err(format!("Failed to read {}", id)),
        };
        (state, result)
    })
    .await
}
