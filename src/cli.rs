use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indexmap::IndexMap;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use jenkins_client::blueocean::DEFAULT_ORGANIZATION;
use jenkins_client::job::{BuildParameter, BuildSelector, CreateJobPayload, JobClient};
use jenkins_client::{Config, HttpTransport, Jenkins, OutputFormat};

use crate::output::{self, muted, report, Outcome};

#[derive(Parser)]
#[command(name = "jclient")]
#[command(author, version, about = "Jenkins command line client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Jenkins root URL
    #[arg(long, global = true, env = "JENKINS_URL")]
    url: Option<String>,

    #[arg(short, long, global = true, env = "JENKINS_USER")]
    user: Option<String>,

    /// API token or password
    #[arg(long, global = true, env = "JENKINS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log request details
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    #[arg(short, long, global = true, value_enum)]
    format: Option<Format>,

    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
    Yaml,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Table => OutputFormat::Table,
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Jobs and builds
    #[command(subcommand)]
    Job(JobCommand),
    /// Pipeline scripts and Blue Ocean pipelines
    #[command(subcommand)]
    Pipeline(PipelineCommand),
    /// Plugin manager
    #[command(subcommand)]
    Plugin(PluginCommand),
    /// Configuration as code
    #[command(subcommand)]
    Casc(CascCommand),
    /// Client configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments that select a parameterized build, which cannot wait or carry a cause.
const PARAMETER_ARGS: [&str; 3] = ["params", "files", "defaults"];

#[derive(Subcommand)]
enum JobCommand {
    Get {
        name: String,
    },
    Build {
        name: String,

        /// String parameter as KEY=VALUE
        #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// File parameter as KEY=PATH
        #[arg(long = "file", value_parser = parse_key_value)]
        files: Vec<(String, String)>,

        /// Fill unspecified parameters from the job's declared defaults
        #[arg(long, default_value_t = false)]
        defaults: bool,

        /// Wait for the build to be scheduled and print it
        #[arg(long, default_value_t = false, conflicts_with_all = PARAMETER_ARGS)]
        wait: bool,

        #[arg(long, conflicts_with_all = PARAMETER_ARGS)]
        cause: Option<String>,

        /// Seconds to wait for the build to start
        #[arg(long, conflicts_with_all = PARAMETER_ARGS)]
        timeout: Option<u32>,

        /// Quiet period in seconds
        #[arg(long, conflicts_with_all = PARAMETER_ARGS)]
        delay: Option<u32>,
    },
    History {
        name: String,
    },
    Log {
        name: String,

        /// Build number, zero or negative for the last build
        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        build: i64,

        /// Keep polling until the build finishes
        #[arg(short, long, default_value_t = false)]
        watch: bool,

        /// Polling interval in seconds
        #[arg(long, default_value_t = 1)]
        interval: u64,
    },
    Stop {
        name: String,

        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        build: i64,
    },
    Enable {
        name: String,
    },
    Disable {
        name: String,
    },
    /// Delete a job, or one of its builds with --build
    Delete {
        name: String,

        #[arg(short, long)]
        build: Option<u32>,
    },
    #[command(subcommand)]
    Params(ParamsCommand),
    Search {
        #[arg(default_value = "")]
        name: String,

        #[arg(long = "type", default_value = "")]
        kind: String,

        #[arg(long, default_value = "")]
        parent: String,

        #[arg(long, default_value_t = 0)]
        start: u32,

        #[arg(long, default_value_t = 50)]
        limit: u32,

        /// Search through Blue Ocean instead
        #[arg(long, default_value_t = false)]
        blue: bool,

        #[arg(long, default_value = DEFAULT_ORGANIZATION)]
        organization: String,
    },
    /// Job types that can be created
    Categories,
    Create {
        name: String,

        /// Job type class, see `job categories`
        #[arg(long)]
        mode: String,

        /// Existing job to copy
        #[arg(long, default_value = "")]
        copy_from: String,

        /// Parent folder, space separated for nesting
        #[arg(long, default_value = "")]
        folder: String,
    },
    #[command(subcommand)]
    Input(InputCommand),
}

#[derive(Subcommand)]
enum ParamsCommand {
    /// Declare parameters from a JSON list
    Add { name: String, parameters: String },
    /// Remove parameters by comma separated names
    Remove { name: String, parameters: String },
}

#[derive(Subcommand)]
enum InputCommand {
    List {
        name: String,
        build: u32,
    },
    Submit {
        name: String,
        build: u32,
        id: String,

        #[arg(long, default_value_t = false)]
        abort: bool,

        #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
}

#[derive(Subcommand)]
enum PipelineCommand {
    Get {
        name: String,
    },
    /// Replace the pipeline script from a file
    Update {
        name: String,
        script: PathBuf,
    },
    /// Look up a pipeline through Blue Ocean
    Blue {
        #[arg(required = true)]
        names: Vec<String>,

        #[arg(long, default_value = DEFAULT_ORGANIZATION)]
        organization: String,
    },
}

#[derive(Subcommand)]
enum PluginCommand {
    List {
        /// Plugins offered by the update center instead of installed ones
        #[arg(long, default_value_t = false)]
        available: bool,

        #[arg(long, default_value_t = 1)]
        depth: u32,

        /// Only names containing this text
        filter: Option<String>,
    },
    Find {
        name: String,
    },
    /// Install plugins given as NAME or NAME@VERSION
    Install {
        #[arg(required = true)]
        names: Vec<String>,

        /// Download versioned packages from the mirror
        #[arg(long, default_value_t = false)]
        mirror: bool,

        #[arg(long, default_value_t = false)]
        progress: bool,
    },
    Uninstall {
        name: String,
    },
    Upload {
        path: PathBuf,

        #[arg(long, default_value_t = false)]
        progress: bool,
    },
    /// Refresh the update center metadata
    CheckUpdate,
}

#[derive(Subcommand)]
enum CascCommand {
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    Schema,
    Reload,
    Apply,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        #[arg(default_value = "jclient.toml")]
        path: PathBuf,

        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).context("Failed to load config")?;

        if let Some(url) = &self.url {
            config.jenkins.url.clone_from(url);
        }
        if let Some(user) = &self.user {
            config.jenkins.username = Some(user.clone());
        }
        if let Some(token) = &self.token {
            config.jenkins.token = Some(token.clone());
        }
        config.jenkins.debug |= self.debug;
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
        config.output.pretty |= self.pretty;

        Ok(config)
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;
        let output = (config.output.format, config.output.pretty);

        match &self.command {
            Commands::Config(command) => execute_config(command, config),
            Commands::Job(command) => {
                let jenkins = Jenkins::from_config(&config)?;
                execute_job(&jenkins, command, output).await
            }
            Commands::Pipeline(command) => {
                let jenkins = Jenkins::from_config(&config)?;
                execute_pipeline(&jenkins, command, output).await
            }
            Commands::Plugin(command) => execute_plugin(command, config, output).await,
            Commands::Casc(command) => {
                let jenkins = Jenkins::from_config(&config)?;
                execute_casc(&jenkins, command).await
            }
        }
    }
}

type Output = (OutputFormat, bool);

async fn execute_job(jenkins: &Jenkins, command: &JobCommand, output: Output) -> Result<()> {
    let (format, pretty) = output;
    let jobs = jenkins.jobs();

    match command {
        JobCommand::Get { name } => {
            let job = jobs.get_job(name).await?;
            output::emit(&job, format, pretty, output::job_table)?;
        }
        JobCommand::Build {
            name,
            params,
            files,
            defaults,
            wait,
            cause,
            timeout,
            delay,
        } => {
            let mut parameters: Vec<BuildParameter> = params
                .iter()
                .map(|(key, value)| BuildParameter::string(key, value))
                .chain(
                    files
                        .iter()
                        .map(|(key, path)| BuildParameter::file(key, path)),
                )
                .collect();
            if *defaults {
                parameters.extend(declared_defaults(&jobs, name, &parameters).await?);
            }

            if !parameters.is_empty() {
                jobs.build_with_params(name, parameters).await?;
                report(Outcome::Added, "Triggered", name);
            } else if *wait || cause.is_some() || timeout.is_some() || delay.is_some() {
                let triggered = jobs
                    .build_and_return(name, cause.as_deref(), *timeout, *delay)
                    .await?;
                output::emit(&triggered, format, pretty, |triggered| {
                    output::builds_table(std::slice::from_ref(&triggered.build))
                })?;
            } else {
                jobs.build(name).await?;
                report(Outcome::Added, "Triggered", name);
            }
        }
        JobCommand::History { name } => {
            let history = jobs.history(name).await;
            output::emit(&history.items, format, pretty, |builds| {
                output::builds_table(builds)
            })?;
            if let Some(error) = history.error {
                return Err(error).context(format!("History of {name} is incomplete"));
            }
        }
        JobCommand::Log {
            name,
            build,
            watch,
            interval,
        } => {
            let selector = BuildSelector::from(*build);
            if *watch {
                jobs.follow_log(name, selector, Duration::from_secs(*interval), |chunk| {
                    print!("{chunk}")
                })
                .await?;
            } else {
                let log = jobs.log(name, selector, 0).await?;
                if log.status != 200 {
                    bail!("No log available for {name} (status {})", log.status);
                }
                print!("{}", log.text);
            }
        }
        JobCommand::Stop { name, build } => {
            jobs.stop(name, *build).await?;
            report(Outcome::Changed, "Stopped", name);
        }
        JobCommand::Enable { name } => {
            jobs.enable(name).await?;
            report(Outcome::Added, "Enabled", name);
        }
        JobCommand::Disable { name } => {
            jobs.disable(name).await?;
            report(Outcome::Changed, "Disabled", name);
        }
        JobCommand::Delete { name, build } => {
            match build {
                Some(number) => jobs.delete_build(name, *number).await?,
                None => jobs.delete(name).await?,
            }
            report(Outcome::Removed, "Deleted", name);
        }
        JobCommand::Params(ParamsCommand::Add { name, parameters }) => {
            jobs.add_parameters(name, parameters).await?;
            report(Outcome::Added, "Added parameters to", name);
        }
        JobCommand::Params(ParamsCommand::Remove { name, parameters }) => {
            jobs.remove_parameters(name, parameters).await?;
            report(Outcome::Changed, "Removed parameters from", name);
        }
        JobCommand::Search {
            name,
            kind,
            parent,
            start,
            limit,
            blue,
            organization,
        } => {
            let items = if *blue {
                jenkins
                    .blue_ocean(organization)
                    .search(name, *start, *limit)
                    .await?
            } else {
                jenkins
                    .jobs()
                    .with_parent(parent.as_str())
                    .search(name, kind, *start, *limit)
                    .await?
            };
            output::emit(&items, format, pretty, |items| output::items_table(items))?;
        }
        JobCommand::Categories => {
            let categories = jobs.categories().await?;
            output::emit(&categories, format, pretty, |categories| {
                output::categories_table(categories)
            })?;
        }
        JobCommand::Create {
            name,
            mode,
            copy_from,
            folder,
        } => {
            let payload = CreateJobPayload {
                name: name.clone(),
                mode: mode.clone(),
                from: copy_from.clone(),
            };
            jobs.create_in_folder(&payload, folder).await?;
            report(Outcome::Added, "Created", name);
        }
        JobCommand::Input(InputCommand::List { name, build }) => {
            let inputs = jobs.pending_inputs(name, *build).await?;
            output::emit(&inputs, format, pretty, |inputs| output::inputs_table(inputs))?;
        }
        JobCommand::Input(InputCommand::Submit {
            name,
            build,
            id,
            abort,
            params,
        }) => {
            let parameters: IndexMap<String, String> = params.iter().cloned().collect();
            jobs.submit_input(name, id, *build, *abort, &parameters).await?;
            let action = if *abort { "Aborted" } else { "Proceeded" };
            report(Outcome::Noted, action, format!("input {id} of {name} #{build}"));
        }
    }

    Ok(())
}

/// Parameters the job declares but the caller did not set, at their defaults.
async fn declared_defaults(
    jobs: &JobClient<HttpTransport>,
    name: &str,
    given: &[BuildParameter],
) -> Result<Vec<BuildParameter>> {
    let job = jobs.get_job(name).await?;
    Ok(job
        .parameter_definitions()
        .filter(|definition| !given.iter().any(|p| p.name() == definition.name))
        .filter_map(|definition| BuildParameter::from_definition(definition, None))
        .collect())
}

async fn execute_pipeline(
    jenkins: &Jenkins,
    command: &PipelineCommand,
    output: Output,
) -> Result<()> {
    let (format, pretty) = output;

    match command {
        PipelineCommand::Get { name } => {
            let pipeline = jenkins.jobs().get_pipeline(name).await?;
            match output::render(&pipeline, format, pretty)? {
                Some(text) => println!("{text}"),
                None => println!("{}", pipeline.script),
            }
        }
        PipelineCommand::Update { name, script } => {
            let script = std::fs::read_to_string(script)
                .with_context(|| format!("Failed to read {}", script.display()))?;
            jenkins.jobs().update_pipeline(name, &script).await?;
            report(Outcome::Changed, "Updated pipeline of", name);
        }
        PipelineCommand::Blue {
            names,
            organization,
        } => {
            let item = jenkins
                .blue_ocean(organization)
                .get_pipeline(names.as_slice())
                .await?;
            output::emit(&item, format, pretty, |item| {
                output::items_table(std::slice::from_ref(item))
            })?;
        }
    }

    Ok(())
}

async fn execute_plugin(command: &PluginCommand, mut config: Config, output: Output) -> Result<()> {
    let (format, pretty) = output;

    match command {
        PluginCommand::Install { mirror, progress, .. } => {
            config.plugin.use_mirror |= *mirror;
            config.plugin.show_progress |= *progress;
        }
        PluginCommand::Upload { progress, .. } => {
            config.plugin.show_progress |= *progress;
        }
        _ => {}
    }
    let plugins = Jenkins::from_config(&config)?.plugins();

    match command {
        PluginCommand::List {
            available: true,
            filter,
            ..
        } => {
            let mut found = plugins.available().await?;
            if let Some(filter) = filter {
                found.retain(|plugin| plugin.name.contains(filter.as_str()));
            }
            output::emit(&found, format, pretty, |found| {
                output::available_plugins_table(found)
            })?;
        }
        PluginCommand::List { depth, filter, .. } => {
            let mut found = plugins.installed(*depth).await?;
            if let Some(filter) = filter {
                found.retain(|plugin| plugin.short_name.contains(filter.as_str()));
            }
            output::emit(&found, format, pretty, |found| {
                output::installed_plugins_table(found)
            })?;
        }
        PluginCommand::Find { name } => match plugins.find_installed(name).await? {
            Some(plugin) => output::emit(&plugin, format, pretty, |plugin| {
                output::installed_plugins_table(std::slice::from_ref(plugin))
            })?,
            None => bail!("Plugin {name} is not installed"),
        },
        PluginCommand::Install { names, .. } => {
            let batch = plugins.install(names.as_slice()).await;
            for name in &batch.items {
                report(Outcome::Added, "Installed", name);
            }
            if let Some(error) = batch.error {
                return Err(error).context(format!(
                    "Stopped after {} of {} plugins",
                    batch.items.len(),
                    names.len()
                ));
            }
        }
        PluginCommand::Uninstall { name } => {
            plugins.uninstall(name).await?;
            report(Outcome::Removed, "Uninstalled", name);
        }
        PluginCommand::Upload { path, .. } => {
            plugins.upload(path).await?;
            report(Outcome::Added, "Uploaded", path.display());
        }
        PluginCommand::CheckUpdate => {
            plugins.check_update().await?;
            report(Outcome::Added, "Update center refresh requested", "");
        }
    }

    Ok(())
}

async fn execute_casc(jenkins: &Jenkins, command: &CascCommand) -> Result<()> {
    let casc = jenkins.casc();

    match command {
        CascCommand::Export { output } => {
            let exported = casc.export().await?;
            match output {
                Some(path) => {
                    std::fs::write(path, exported)?;
                    info!("Configuration written to: {}", path.display());
                }
                None => println!("{exported}"),
            }
        }
        CascCommand::Schema => println!("{}", casc.schema().await?),
        CascCommand::Reload => {
            casc.reload().await?;
            report(Outcome::Added, "Configuration reloaded", "");
        }
        CascCommand::Apply => {
            casc.apply().await?;
            report(Outcome::Added, "Configuration applied", "");
        }
    }

    Ok(())
}

fn execute_config(command: &ConfigCommand, mut config: Config) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if config.jenkins.token.is_some() {
                config.jenkins.token = Some("********".to_string());
            }
            let (format, pretty) = (config.output.format, config.output.pretty);
            match output::render(&config, format, pretty)? {
                Some(text) => println!("{text}"),
                None => println!("{}", toml::to_string_pretty(&config)?),
            }
        }
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists, use --force to overwrite", path.display());
            }
            Config::default().save(path)?;
            report(Outcome::Added, "Wrote", muted(path.display()));
        }
    }

    Ok(())
}
