use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use linkwiz_config::{
  BpmnElement, ClientConfig, ProcessLinkQuery, ProcessLinkType, activity_type_with_suffix,
};
use linkwiz_gateway::{HttpGateway, LinkPersistenceGateway, PluginCatalog};
use linkwiz_wizard::{Catalog, LocaleHandle, ProcessLinkWizard};

/// linkwiz - link BPMN activities to forms, form flows and plugin actions
#[derive(Parser)]
#[command(name = "linkwiz")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.linkwiz)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Backend base URL, overrides config.json
  #[arg(long, global = true, env = "LINKWIZ_BASE_URL")]
  base_url: Option<String>,

  /// Bearer token, overrides config.json
  #[arg(long, global = true, env = "LINKWIZ_TOKEN", hide_env_values = true)]
  token: Option<String>,

  /// Locale for step labels, overrides config.json
  #[arg(long, global = true)]
  locale: Option<String>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List the link types allowed for a BPMN element type
  Candidates {
    /// BPMN element type, e.g. bpmn:ServiceTask
    #[arg(long)]
    activity_type: String,
  },

  /// Show the link of an activity and the wizard steps it opens on
  Show {
    #[arg(long)]
    process_definition_id: String,

    #[arg(long)]
    activity_id: String,

    /// BPMN element type, e.g. bpmn:UserTask
    #[arg(long, default_value = "bpmn:ServiceTask")]
    activity_type: String,
  },

  /// List plugin definitions, configurations and functions for an element type
  Plugins {
    #[arg(long)]
    activity_type: String,
  },

  /// Create or update the link of an activity
  Link {
    #[command(subcommand)]
    target: LinkTarget,
  },

  /// Delete the link of an activity
  Unlink {
    #[command(flatten)]
    activity: ActivityArgs,
  },
}

#[derive(Args)]
struct ActivityArgs {
  #[arg(long)]
  process_definition_id: String,

  #[arg(long)]
  activity_id: String,

  /// BPMN element type, e.g. bpmn:UserTask
  #[arg(long, default_value = "bpmn:ServiceTask")]
  activity_type: String,

  /// Display name of the activity
  #[arg(long, default_value = "")]
  name: String,
}

impl ActivityArgs {
  fn element(&self) -> BpmnElement {
    BpmnElement::new(&self.activity_id, &self.name, &self.activity_type)
  }
}

#[derive(Subcommand)]
enum LinkTarget {
  /// Link a plugin action; action properties are read as JSON from stdin
  Plugin {
    #[command(flatten)]
    activity: ActivityArgs,

    /// Plugin configuration id
    #[arg(long)]
    configuration: String,

    /// Plugin action (function) key
    #[arg(long)]
    action: String,
  },

  /// Link a form definition
  Form {
    #[command(flatten)]
    activity: ActivityArgs,

    #[arg(long)]
    form_definition: String,
  },

  /// Link a form flow definition
  FormFlow {
    #[command(flatten)]
    activity: ActivityArgs,

    #[arg(long)]
    form_flow_definition: String,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    )
    .init();

  let cli = Cli::parse();

  let Some(command) = cli.command else {
    println!("linkwiz - use --help to see available commands");
    return Ok(());
  };

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".linkwiz"),
  };
  let config_path = data_dir.join("config.json");
  let mut config = ClientConfig::load_or_default(&config_path)
    .with_context(|| format!("failed to load config: {}", config_path.display()))?;
  if let Some(base_url) = cli.base_url {
    config.base_url = base_url;
  }
  if let Some(token) = cli.token {
    config.token = Some(token);
  }
  if let Some(locale) = cli.locale {
    config.locale = locale;
  }
  debug!(path = %config_path.display(), base_url = %config.base_url, "config_loaded");

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(command, config).await })
}

async fn run(command: Commands, config: ClientConfig) -> Result<()> {
  let gateway = Arc::new(HttpGateway::from_config(&config).context("invalid backend URL")?);
  eprintln!("Backend: {}", gateway.base_url());

  match command {
    Commands::Candidates { activity_type } => {
      let activity_type = activity_type_with_suffix(&activity_type);
      let candidates = gateway
        .get_process_link_candidates(&activity_type)
        .await
        .context("failed to fetch link types")?;
      eprintln!("{} link type(s) for {}", candidates.len(), activity_type);
      println!("{}", serde_json::to_string_pretty(&candidates)?);
    }
    Commands::Show {
      process_definition_id,
      activity_id,
      activity_type,
    } => {
      let links = gateway
        .get_process_link(&ProcessLinkQuery::new(&process_definition_id, &activity_id))
        .await
        .context("failed to fetch process link")?;

      let wizard = ProcessLinkWizard::new(gateway.clone(), gateway.clone());
      let locale = LocaleHandle::new(&config.locale);
      let view = wizard
        .store()
        .steps()
        .translated(locale.subscribe(), Arc::new(Catalog::builtin()));
      let element = BpmnElement::new(&activity_id, "", &activity_type);
      wizard.open(element, &process_definition_id).await?;

      let output = json!({
        "links": links,
        "state": wizard.state(),
        "steps": view.current(),
        "currentStep": view.current_index(),
        "buttons": wizard.store().button_state(),
      });
      println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Commands::Plugins { activity_type } => {
      let activity_type = activity_type_with_suffix(&activity_type);
      let definitions = gateway
        .list_plugin_definitions(&activity_type)
        .await
        .context("failed to fetch plugin definitions")?;
      eprintln!("{} plugin definition(s)", definitions.len());

      let mut plugins = Vec::with_capacity(definitions.len());
      for definition in definitions {
        let configurations = gateway
          .list_plugin_configurations(Some(definition.key.as_str()))
          .await
          .with_context(|| format!("failed to fetch configurations of '{}'", definition.key))?;
        let functions = gateway
          .list_plugin_functions(&definition.key, &activity_type)
          .await
          .with_context(|| format!("failed to fetch actions of '{}'", definition.key))?;
        plugins.push(json!({
          "definition": definition,
          "configurations": configurations,
          "actions": functions,
        }));
      }
      println!("{}", serde_json::to_string_pretty(&plugins)?);
    }
    Commands::Link { target } => link(gateway, target).await?,
    Commands::Unlink { activity } => {
      let wizard = ProcessLinkWizard::new(gateway.clone(), gateway);
      wizard
        .open(activity.element(), &activity.process_definition_id)
        .await?;
      if wizard.state().existing_link().is_none() {
        bail!("activity '{}' has no process link", activity.activity_id);
      }
      wizard.on_delete().await.context("failed to delete process link")?;
      eprintln!("Unlinked {}", activity.activity_id);
    }
  }

  Ok(())
}

async fn link(gateway: Arc<HttpGateway>, target: LinkTarget) -> Result<()> {
  let wizard = ProcessLinkWizard::new(gateway.clone(), gateway);

  let (activity, link_type) = match &target {
    LinkTarget::Plugin { activity, .. } => (activity, ProcessLinkType::Plugin),
    LinkTarget::Form { activity, .. } => (activity, ProcessLinkType::Form),
    LinkTarget::FormFlow { activity, .. } => (activity, ProcessLinkType::FormFlow),
  };

  wizard
    .open(activity.element(), &activity.process_definition_id)
    .await?;
  if let Some(existing) = wizard.state().existing_link() {
    if existing.process_link_type != link_type {
      bail!(
        "activity '{}' is linked as {} ({}); unlink it first",
        activity.activity_id,
        existing.process_link_type,
        existing.id
      );
    }
  }
  if wizard.state().selected_link_type() != Some(link_type) {
    wizard.select_link_type(link_type).with_context(|| {
      format!(
        "link type '{}' is not allowed for {}",
        link_type, activity.activity_type
      )
    })?;
  }

  let mut action_properties = serde_json::Value::Null;
  match &target {
    LinkTarget::Plugin {
      configuration,
      action,
      ..
    } => {
      let selected = wizard
        .plugin_configuration(configuration)
        .await
        .with_context(|| format!("plugin configuration '{}' not found", configuration))?;
      wizard.select_plugin_configuration(&selected)?;
      wizard.select_plugin_function(action)?;
      action_properties = read_payload_from_stdin()?;
    }
    LinkTarget::Form {
      form_definition, ..
    } => wizard.select_form_definition(form_definition)?,
    LinkTarget::FormFlow {
      form_flow_definition,
      ..
    } => wizard.select_form_flow_definition(form_flow_definition)?,
  }

  let editing = wizard.state().existing_link().is_some();
  let link = wizard
    .save(action_properties)
    .await
    .context("failed to save process link")?;

  eprintln!(
    "{} {} link {}",
    if editing { "Updated" } else { "Created" },
    link.process_link_type,
    link.id
  );
  println!("{}", serde_json::to_string_pretty(&link)?);

  Ok(())
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    return Ok(json!({}));
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read action properties from stdin")?;

  if input.trim().is_empty() {
    Ok(json!({}))
  } else {
    serde_json::from_str(&input).context("failed to parse action properties JSON from stdin")
  }
}
