//! Command execution.
//!
//! Maps each subcommand onto the library: content input, the dispatcher,
//! the config store and the history log. Output goes through a [`Console`]
//! so that commands can be tested against in-memory buffers.

use std::io::Write;

use chrono::{DateTime, Local};
use thiserror::Error;

use trmnl::config::{
    Command, Config, ConfigAction, ConfigError, ConfigStore, ContentArgs, HistoryAction,
    HistoryArgs, PluginAction, SendArgs, TierArg, ValidateArgs,
};
use trmnl::history::{
    HistoryError, HistoryFilter, HistoryLog, format_entry, parse_since, parse_until,
};
use trmnl::input::{ContentSource, InputError, read_content};
use trmnl::payload::{Tier, WebhookPayload, validate};
use trmnl::time::{Clock, SystemClock};
use trmnl::webhook::{Dispatcher, HttpClient, SendOptions};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for command failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration could not be saved, or a plugin does not exist.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No content could be obtained.
    #[error(transparent)]
    Input(#[from] InputError),

    /// History could not be changed, or a time bound did not parse.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// Writing to the terminal failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// JSON output could not be encoded.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The send failed; details were already printed.
    #[error("Send failed")]
    SendFailed,

    /// Validation found errors; the report was already printed.
    #[error("Payload is invalid")]
    InvalidPayload,
}

impl RunError {
    /// Returns true if the command already printed the failure details.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::SendFailed | Self::InvalidPayload)
    }
}

/// Output streams for command results (stdout) and failures (stderr).
#[derive(Debug)]
pub struct Console<O, E> {
    pub out: O,
    pub err: E,
}

impl Console<std::io::Stdout, std::io::Stderr> {
    /// The process's standard streams.
    pub fn stdio() -> Self {
        Self {
            out: std::io::stdout(),
            err: std::io::stderr(),
        }
    }
}

/// Everything a command needs from the outside world.
#[derive(Debug)]
pub struct App<H, C = SystemClock> {
    store: ConfigStore,
    client: H,
    clock: C,
    env_webhook: Option<String>,
}

impl<H> App<H, SystemClock> {
    /// Creates an app over the given config store and HTTP client.
    pub const fn new(store: ConfigStore, client: H) -> Self {
        Self {
            store,
            client,
            clock: SystemClock,
            env_webhook: None,
        }
    }
}

impl<H, C> App<H, C> {
    /// Sets the clock used for history timestamps and filters.
    #[cfg(test)]
    pub fn with_clock<C2>(self, clock: C2) -> App<H, C2> {
        App {
            store: self.store,
            client: self.client,
            clock,
            env_webhook: self.env_webhook,
        }
    }

    /// Sets the `TRMNL_WEBHOOK` value; empty values are ignored.
    pub fn with_env_webhook(mut self, url: Option<String>) -> Self {
        self.env_webhook = url.filter(|u| !u.trim().is_empty());
        self
    }
}

impl<H, C> App<H, C>
where
    H: HttpClient + Clone,
    C: Clock + Clone,
{
    /// Runs one subcommand.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] for every outcome that should exit non-zero.
    pub async fn execute<O: Write, E: Write>(
        &self,
        command: Command,
        console: &mut Console<O, E>,
    ) -> Result<(), RunError> {
        match command {
            Command::Send(args) => self.send(args, console).await,
            Command::Validate(args) => self.validate(args, &mut console.out).await,
            Command::Config { action: None } => self.show_config(&mut console.out),
            Command::Config {
                action: Some(ConfigAction::History { path, max_size_mb }),
            } => self.history_settings(path, max_size_mb, &mut console.out),
            Command::Tier { value } => self.tier(value, &mut console.out),
            Command::Plugin { action } => self.plugin(action, &mut console.out),
            Command::Plugins => self.list_plugins(&mut console.out),
            Command::History { action, query } => self.history(action, &query, &mut console.out),
        }
    }

    async fn send<O: Write, E: Write>(
        &self,
        args: SendArgs,
        console: &mut Console<O, E>,
    ) -> Result<(), RunError> {
        let payload = read_payload(args.content).await?;
        let config = self.store.load();
        let history = history_log(&config);

        let dispatcher = Dispatcher::new(self.client.clone(), config)
            .with_clock(self.clock.clone())
            .with_env_webhook(self.env_webhook.clone())
            .with_history(history);
        let options = SendOptions {
            webhook_url: args.webhook,
            plugin: args.plugin,
            tier: None,
            skip_validation: args.skip_validation,
            skip_log: args.skip_log,
        };

        let result = dispatcher.send(&payload, &options).await;
        let out = &mut console.out;

        if args.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        } else if result.success {
            match &result.plugin {
                Some(plugin) => writeln!(out, "✓ Sent to TRMNL ({plugin})")?,
                None => writeln!(out, "✓ Sent to TRMNL")?,
            }
            if let Some(status) = result.status_code {
                writeln!(out, "  Status: {status}")?;
            }
            writeln!(out, "  Time: {}ms", result.duration_ms)?;
            writeln!(
                out,
                "  Size: {} bytes ({}% of limit)",
                result.validation.size_bytes, result.validation.percent_used
            )?;
        } else {
            writeln!(console.err, "✗ Failed to send")?;
            if let Some(error) = &result.error {
                writeln!(console.err, "  Error: {error}")?;
            }
            writeln!(out)?;
            writeln!(out, "Validation:")?;
            writeln!(out, "{}", result.validation)?;
        }

        if result.success {
            Ok(())
        } else {
            Err(RunError::SendFailed)
        }
    }

    async fn validate(&self, args: ValidateArgs, out: &mut impl Write) -> Result<(), RunError> {
        let payload = read_payload(args.content).await?;
        let tier = args
            .tier
            .map_or_else(|| self.store.load().tier, Tier::from);

        let result = validate(&payload, tier);
        if args.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        } else {
            writeln!(out, "{result}")?;
        }

        if result.valid {
            Ok(())
        } else {
            Err(RunError::InvalidPayload)
        }
    }

    fn show_config(&self, out: &mut impl Write) -> Result<(), RunError> {
        let config = self.store.load();

        writeln!(out, "Config file: {}", self.store.path().display())?;
        writeln!(out)?;

        writeln!(out, "Plugins:")?;
        let entries = config.plugin_entries();
        if entries.is_empty() {
            writeln!(out, "  (none configured)")?;
            writeln!(out)?;
            writeln!(out, "  Add a plugin:")?;
            writeln!(out, "    trmnl plugin add <name> <url>")?;
        }
        for entry in entries {
            let mark = if entry.is_default { " (default)" } else { "" };
            writeln!(out, "  {}{mark}", entry.name)?;
            writeln!(out, "    url: {}", entry.plugin.url)?;
            if let Some(description) = &entry.plugin.description {
                writeln!(out, "    desc: {description}")?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Tier: {}", config.tier)?;
        writeln!(out, "  Limit: {}", config.tier.limit_label())?;

        writeln!(out)?;
        writeln!(out, "History:")?;
        writeln!(out, "  path: {}", config.history_path().display())?;
        writeln!(out, "  maxSizeMb: {}", config.history.max_size_mb)?;

        writeln!(out)?;
        writeln!(out, "Environment:")?;
        writeln!(
            out,
            "  TRMNL_WEBHOOK: {}",
            self.env_webhook.as_deref().unwrap_or("(not set)")
        )?;
        Ok(())
    }

    fn history_settings(
        &self,
        path: Option<String>,
        max_size_mb: Option<u64>,
        out: &mut impl Write,
    ) -> Result<(), RunError> {
        if path.is_none() && max_size_mb.is_none() {
            let config = self.store.load();
            writeln!(out, "History path: {}", config.history.path)?;
            writeln!(out, "Max size: {} MB", config.history.max_size_mb)?;
            return Ok(());
        }

        let settings = self.store.update(|config| {
            if let Some(path) = path {
                config.history.path = path;
            }
            if let Some(max) = max_size_mb {
                config.history.max_size_mb = max;
            }
            config.history.clone()
        })?;

        writeln!(out, "✓ History path: {}", settings.path)?;
        writeln!(out, "✓ Max size: {} MB", settings.max_size_mb)?;
        Ok(())
    }

    fn tier(&self, value: Option<TierArg>, out: &mut impl Write) -> Result<(), RunError> {
        let Some(value) = value else {
            let tier = self.store.load().tier;
            writeln!(out, "Tier: {tier}")?;
            writeln!(out, "Limit: {}", tier.limit_label())?;
            return Ok(());
        };

        let tier = Tier::from(value);
        self.store.update(|config| config.tier = tier)?;
        writeln!(out, "✓ Tier set to: {tier}")?;
        Ok(())
    }

    fn plugin(&self, action: Option<PluginAction>, out: &mut impl Write) -> Result<(), RunError> {
        let Some(action) = action else {
            return self.list_plugins(out);
        };

        let mut config = self.store.load();
        match action {
            PluginAction::Add {
                name,
                url,
                description,
                default,
            } => {
                if url::Url::parse(&url).is_err() {
                    tracing::warn!("'{url}' does not look like a URL; sends to '{name}' will fail");
                }
                config.set_plugin(&name, &url, description);
                if default {
                    config.set_default_plugin(&name);
                }
                self.store.save(&config)?;
                writeln!(out, "✓ Added plugin: {name}")?;
                if config.default_plugin.as_deref() == Some(name.as_str()) {
                    writeln!(out, "✓ Set as default")?;
                }
            }
            PluginAction::Rm { name } => {
                if !config.remove_plugin(&name) {
                    return Err(ConfigError::PluginNotFound(name).into());
                }
                self.store.save(&config)?;
                writeln!(out, "✓ Removed plugin: {name}")?;
                if let Some(default) = &config.default_plugin {
                    writeln!(out, "  Default plugin: {default}")?;
                }
            }
            PluginAction::Default { name } => {
                if !config.set_default_plugin(&name) {
                    return Err(ConfigError::PluginNotFound(name).into());
                }
                self.store.save(&config)?;
                writeln!(out, "✓ Default plugin: {name}")?;
            }
            PluginAction::Set {
                name,
                url,
                description,
            } => {
                // An empty description clears it.
                let description = description.map(|d| Some(d).filter(|d| !d.is_empty()));
                config.update_plugin(&name, url.as_deref(), description)?;
                self.store.save(&config)?;
                writeln!(out, "✓ Updated plugin: {name}")?;
            }
            PluginAction::List => return self.list_plugins(out),
        }
        Ok(())
    }

    fn list_plugins(&self, out: &mut impl Write) -> Result<(), RunError> {
        let config = self.store.load();
        let entries = config.plugin_entries();

        if entries.is_empty() {
            writeln!(out, "No plugins configured.")?;
            writeln!(out)?;
            writeln!(out, "Add a plugin:")?;
            writeln!(out, "  trmnl plugin add <name> <url>")?;
            return Ok(());
        }

        writeln!(out, "Plugins:")?;
        for entry in entries {
            let mark = if entry.is_default { " ★" } else { "" };
            writeln!(out, "  {}{mark}", entry.name)?;
            writeln!(out, "    {}", entry.plugin.url)?;
            if let Some(description) = &entry.plugin.description {
                writeln!(out, "    {description}")?;
            }
        }
        writeln!(out)?;
        writeln!(out, "★ = default plugin")?;
        Ok(())
    }

    fn history(
        &self,
        action: Option<HistoryAction>,
        query: &HistoryArgs,
        out: &mut impl Write,
    ) -> Result<(), RunError> {
        let config = self.store.load();
        let log = history_log(&config);
        let now = self.clock.now().with_timezone(&Local);

        match action {
            Some(HistoryAction::Clear { confirm }) => clear_history(&log, confirm, out),
            Some(HistoryAction::Stats) => history_stats(&log, &now, out),
            None => list_history(&log, query, &now, out),
        }
    }
}

async fn read_payload(args: ContentArgs) -> Result<WebhookPayload, RunError> {
    let content = read_content(ContentSource::from_args(args.content, args.file)).await?;
    Ok(WebhookPayload::from_input(&content))
}

fn history_log(config: &Config) -> HistoryLog {
    HistoryLog::new(config.history_path()).with_max_size_mb(config.history.max_size_mb)
}

fn history_filter(query: &HistoryArgs) -> Result<HistoryFilter, HistoryError> {
    Ok(HistoryFilter {
        last: Some(query.last),
        today: query.today,
        failed: query.failed,
        success: query.success,
        since: query
            .since
            .as_deref()
            .map(|s| parse_since(s, &Local))
            .transpose()?,
        until: query
            .until
            .as_deref()
            .map(|s| parse_until(s, &Local))
            .transpose()?,
    })
}

fn list_history(
    log: &HistoryLog,
    query: &HistoryArgs,
    now: &DateTime<Local>,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let filter = history_filter(query)?;
    let entries = log.query(&filter, now);

    if query.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(out, "No history entries found.")?;
        writeln!(out, "History file: {}", log.path().display())?;
        return Ok(());
    }

    if let Some(stats) = log.stats(now) {
        writeln!(
            out,
            "History: {} total entries ({} MB)",
            stats.entries,
            stats.file_size_mb()
        )?;
        writeln!(out)?;
    }

    if let Some(description) = filter.describe() {
        writeln!(out, "Filter: {description}")?;
        writeln!(out)?;
    }

    writeln!(
        out,
        "Showing {} entries (most recent first):",
        entries.len()
    )?;
    writeln!(out)?;
    for entry in &entries {
        writeln!(out, "{}", format_entry(entry, query.verbose))?;
    }
    Ok(())
}

fn clear_history(log: &HistoryLog, confirm: bool, out: &mut impl Write) -> Result<(), RunError> {
    if !confirm {
        writeln!(out, "This will delete all history. Use --confirm to proceed.")?;
        writeln!(out, "History file: {}", log.path().display())?;
        return Ok(());
    }

    if log.clear()? {
        writeln!(out, "✓ History cleared")?;
    } else {
        writeln!(out, "History file does not exist.")?;
    }
    Ok(())
}

fn history_stats(
    log: &HistoryLog,
    now: &DateTime<Local>,
    out: &mut impl Write,
) -> Result<(), RunError> {
    let Some(stats) = log.stats(now) else {
        writeln!(out, "No history file found.")?;
        return Ok(());
    };

    writeln!(out, "History Statistics")?;
    writeln!(out)?;
    writeln!(out, "File:     {}", log.path().display())?;
    writeln!(out, "{stats}")?;
    Ok(())
}
