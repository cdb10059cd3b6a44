//! urlvinegar 命令行入口

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use urlvinegar::{
    CleaningSession, ConfigManager, GlobalConfig, QueryParam, RuleBook, RuleStore, SessionOutcome,
    extract_url, host_label, is_valid_pattern, parse_query_params, transform_matches,
};

/// 非 http(s) 结果的退出码
const EXIT_INVALID_SCHEME: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "urlvinegar", version)]
#[command(about = "Clean tracking junk out of URLs with ordered regex rewrite rules", long_about = None)]
struct Cli {
    /// Rules/allow-list JSON file (default: $URLVINEGAR_CONFIG, then ./urlvinegar_rules.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract the URL from TEXT and print the cleaned URL.
    Clean {
        text: String,
        /// Skip the rule at this index for this run only.
        #[arg(long = "disable", value_name = "IDX")]
        disable: Vec<usize>,
        /// Drop this query parameter by hand.
        #[arg(long = "remove-param", value_name = "NAME")]
        remove_param: Vec<String>,
        /// Also drop every parameter missing from the allow-list.
        #[arg(long)]
        allowed_only: bool,
        /// Print the full outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Explain which rule (or manual removal) drops each query parameter.
    Explain {
        text: String,
        #[arg(long = "disable", value_name = "IDX")]
        disable: Vec<usize>,
        #[arg(long = "remove-param", value_name = "NAME")]
        remove_param: Vec<String>,
        #[arg(long)]
        json: bool,
    },

    /// List query parameters, marking the allow-listed ones as kept.
    Params { text: String },

    /// List configured rules.
    Rules {
        /// Show whether each rule matches this URL.
        #[arg(long)]
        url: Option<String>,
    },

    /// Append a new enabled rule.
    AddRule {
        #[arg(long)]
        name: String,
        #[arg(long)]
        pattern: String,
        #[arg(long, default_value = "")]
        replacement: String,
    },

    /// Replace name, pattern and replacement of the rule at INDEX.
    UpdateRule {
        index: usize,
        #[arg(long)]
        name: String,
        #[arg(long)]
        pattern: String,
        #[arg(long, default_value = "")]
        replacement: String,
    },

    /// Delete the rule at INDEX.
    RemoveRule { index: usize },

    /// Move the rule at FROM to position TO.
    MoveRule { from: usize, to: usize },

    /// Flip the persisted enabled flag of the rule at INDEX.
    ToggleRule { index: usize },

    /// Append a rule that strips one query parameter, named after the host of URL.
    AddParamRule {
        /// Text containing the URL the parameter was seen on.
        text: String,
        param: String,
    },

    /// Add a parameter to the allow-list.
    Allow {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Rename or re-describe the allow-listed parameter at INDEX.
    UpdateAllowed {
        index: usize,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Remove a parameter from the allow-list.
    Disallow { name: String },

    /// Delete the config file, restoring the built-in rules.
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(config.verbose);

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("urlvinegar error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "urlvinegar=debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> GlobalConfig {
    let rules_path = match &cli.config {
        Some(path) => path.clone(),
        None => ConfigManager::from_env().rules_path,
    };
    ConfigManager::custom()
        .rules_path(rules_path)
        .verbose(cli.verbose)
        .build()
}

fn run(command: Command, config: &GlobalConfig) -> Result<ExitCode> {
    let mut book = RuleStore::load(config).context("failed to load rules")?;
    tracing::debug!("loaded {} rules from {}", book.rules.len(), config.rules_path.display());

    match command {
        Command::Clean {
            text,
            disable,
            remove_param,
            allowed_only,
            json,
        } => {
            let outcome = clean_outcome(&text, &book, disable, remove_param, allowed_only)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.cleaned_url);
            }
            return Ok(scheme_exit_code(&outcome));
        }
        Command::Explain {
            text,
            disable,
            remove_param,
            json,
        } => {
            let session = open_session(&text, &book, disable, remove_param)?;
            let outcome = session.outcome();

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.params)?);
            } else {
                print_explanation(&session, &outcome);
            }
            return Ok(scheme_exit_code(&outcome));
        }
        Command::Params { text } => {
            let url = require_url(&text)?;
            for param in parse_query_params(&url, &book.allowed_names()) {
                println!("[{}] {}", if param.keep { "x" } else { " " }, param);
            }
        }
        Command::Rules { url } => print_rules(&book, url.as_deref()),
        Command::AddRule {
            name,
            pattern,
            replacement,
        } => {
            let index = book.add_rule(&name, &pattern, &replacement)?;
            save(config, &book)?;
            println!("added rule #{}", index);
        }
        Command::UpdateRule {
            index,
            name,
            pattern,
            replacement,
        } => {
            book.update_rule(index, &name, &pattern, &replacement)?;
            save(config, &book)?;
        }
        Command::RemoveRule { index } => {
            let removed = book.remove_rule(index)?;
            save(config, &book)?;
            println!("removed rule {}", removed.name);
        }
        Command::MoveRule { from, to } => {
            book.move_rule(from, to)?;
            save(config, &book)?;
        }
        Command::ToggleRule { index } => {
            let enabled = !book.rules.get(index).map(|r| r.enabled).unwrap_or(false);
            book.set_enabled(index, enabled)?;
            save(config, &book)?;
            println!("rule #{} {}", index, if enabled { "enabled" } else { "disabled" });
        }
        Command::AddParamRule { text, param } => {
            let url = require_url(&text)?;
            let host = host_label(&url).unwrap_or_else(|| "URL".to_string());
            let index = book.add_param_removal_rule(&param, &host)?;
            save(config, &book)?;
            println!("added rule #{} {}", index, book.rules[index]);
        }
        Command::Allow { name, description } => {
            book.add_allowed(&name, &description)?;
            save(config, &book)?;
        }
        Command::UpdateAllowed {
            index,
            name,
            description,
        } => {
            book.update_allowed(index, &name, &description)?;
            save(config, &book)?;
        }
        Command::Disallow { name } => {
            book.remove_allowed(&name)?;
            save(config, &book)?;
        }
        Command::Reset => {
            RuleStore::reset(config)?;
            println!("restored built-in rules");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn require_url(text: &str) -> Result<String> {
    match extract_url(text) {
        Some(url) => Ok(url),
        None => bail!("no http(s) URL found in input"),
    }
}

fn open_session(
    text: &str,
    book: &RuleBook,
    disable: Vec<usize>,
    remove_param: Vec<String>,
) -> Result<CleaningSession> {
    let url = require_url(text)?;
    let mut session = CleaningSession::new(url, book.rules.clone());
    for index in disable {
        session.disable_rule(index);
    }
    for name in remove_param {
        session.remove_param(name);
    }
    Ok(session)
}

fn clean_outcome(
    text: &str,
    book: &RuleBook,
    disable: Vec<usize>,
    remove_param: Vec<String>,
    allowed_only: bool,
) -> Result<SessionOutcome> {
    let session = open_session(text, book, disable, remove_param)?;
    Ok(if allowed_only {
        session.outcome_allowed_only(&book.allowed_names())
    } else {
        session.outcome()
    })
}

fn exit_status(outcome: &SessionOutcome) -> u8 {
    if outcome.can_share() { 0 } else { EXIT_INVALID_SCHEME }
}

fn scheme_exit_code(outcome: &SessionOutcome) -> ExitCode {
    if let Some(error) = outcome.process.error.as_deref().filter(|_| !outcome.can_share()) {
        eprintln!("warning: {}", error);
    }
    ExitCode::from(exit_status(outcome))
}

fn save(config: &GlobalConfig, book: &RuleBook) -> Result<()> {
    RuleStore::save(config, book)
        .with_context(|| format!("failed to save {}", config.rules_path.display()))
}

fn print_explanation(session: &CleaningSession, outcome: &SessionOutcome) {
    let host = host_label(session.original_url()).unwrap_or_else(|| "URL".to_string());
    println!("{} -> {}", host, outcome.cleaned_url);

    let relevant = session.relevant_rules();
    if !relevant.is_empty() {
        println!("rules:");
        for (index, rule) in relevant {
            let active = rule.enabled && !session.disabled_overrides().contains(&index);
            println!("  [{}] #{} {}", if active { "x" } else { " " }, index, rule.name);
        }
    }

    if !outcome.params.is_empty() {
        println!("params:");
        for param in &outcome.params {
            println!("  {}", describe_param(param));
        }
    }
}

fn describe_param(param: &QueryParam) -> String {
    match (param.keep, param.removed_by.as_deref()) {
        (true, _) => format!("[x] {}", param),
        (false, Some(rule)) => format!("[ ] {}  (removed by {})", param, rule),
        (false, None) => format!("[ ] {}  (removed manually)", param),
    }
}

fn print_rules(book: &RuleBook, url: Option<&str>) {
    for (index, rule) in book.rules.iter().enumerate() {
        let mut flags = String::new();
        flags.push(if rule.enabled { 'E' } else { '-' });
        flags.push(if is_valid_pattern(&rule.pattern) { 'V' } else { '!' });
        if let Some(url) = url {
            flags.push(if transform_matches(url, rule) { 'M' } else { '-' });
        }
        println!("#{:<3} {} {}", index, flags, rule);
    }
}
