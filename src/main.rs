// ABOUTME: Entry point for the threadchat terminal client
// Wires configuration, the HTTP client, session setup, and the chat loop

use anyhow::{bail, Context, Result};
use clap::{Arg, Command as ClapCommand};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use threadchat::api::client::OpenAiAssistants;
use threadchat::app::config::AppConfig;
use threadchat::app::coordinator::{CancelToken, RunCoordinator, TurnRequest};
use threadchat::app::session::{Role, Session, SessionStore};
use threadchat::ui::chat::{self, Command};
use threadchat::utils::pricing::PricingTable;
use threadchat::ThreadChatError;

const DEFAULT_INSTRUCTIONS: &str = "You are a helpful assistant.";

#[tokio::main]
async fn main() -> Result<()> {
    let config = parse_args()?;

    // Initialize logging if debug mode
    if config.debug {
        tracing_subscriber::fmt()
            .with_env_filter("threadchat=debug")
            .init();
    }

    config.validate()?;

    let pricing = PricingTable::load_from_json(config.pricing_path()).with_context(|| {
        format!(
            "could not load pricing table from {}",
            config.pricing_path().display()
        )
    })?;
    if pricing.is_empty() {
        bail!("pricing table {} is empty", config.pricing_path().display());
    }
    if !pricing.contains(&config.default_model) {
        bail!(
            "default model {} is not in the pricing table",
            config.default_model
        );
    }

    let instructions = std::fs::read_to_string(config.instructions_path())
        .unwrap_or_else(|_| DEFAULT_INSTRUCTIONS.to_string());

    let api = OpenAiAssistants::new(&config.api_key);
    let mut store = SessionStore::new();
    store.initialize(&api, &config, &instructions).await?;

    if !atty::is(atty::Stream::Stdin) {
        // Non-interactive mode - answer one query from stdin and exit
        return run_one_shot(&api, &pricing, &config, &mut store).await;
    }

    run_repl(&api, &pricing, &config, &mut store, instructions).await
}

fn parse_args() -> Result<AppConfig> {
    let matches = ClapCommand::new("threadchat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal chat front-end for hosted assistant threads with token and cost tracking")
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("ID")
                .help("Model identifier (must exist in the pricing table)"),
        )
        .arg(
            Arg::new("temperature")
                .short('t')
                .long("temperature")
                .value_name("FLOAT")
                .help("Sampling temperature in [0.0, 2.0]"),
        )
        .arg(
            Arg::new("base-path")
                .short('b')
                .long("base-path")
                .value_name("DIR")
                .help("Directory holding aimodels.json and instructions.md"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging and the diagnostics panel")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let mut config = AppConfig::load()?;

    if let Some(model) = matches.get_one::<String>("model") {
        config.default_model = model.clone();
    }
    if let Some(temp) = matches.get_one::<String>("temperature") {
        config.default_temperature = temp
            .parse()
            .map_err(|_| ThreadChatError::Config(format!("--temperature is not a number: {temp}")))?;
    }
    if let Some(base) = matches.get_one::<String>("base-path") {
        config.base_path = base.into();
    }
    config.debug = matches.get_flag("debug");

    Ok(config)
}

/// Run one cycle with a Ctrl-C watcher wired to the cancel token.
async fn run_cycle(
    coordinator: &RunCoordinator<'_>,
    session: &mut Session,
    request: &TurnRequest<'_>,
) -> threadchat::Result<threadchat::Answer> {
    let cancel = CancelToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = coordinator.execute_turn(session, request, &cancel).await;
    watcher.abort();
    result
}

fn report_cycle_error(err: &ThreadChatError) {
    match err {
        ThreadChatError::RunFailed(status) => {
            println!("✗ The run ended with status '{status}'; nothing was added to the conversation.");
        }
        ThreadChatError::RunTimeout(secs) => {
            println!("✗ No terminal status after {secs} seconds; giving up on this run.");
        }
        ThreadChatError::Cancelled => {
            println!("✗ Cancelled.");
        }
        other => {
            println!("✗ {other}");
        }
    }
}

async fn run_one_shot(
    api: &OpenAiAssistants,
    pricing: &PricingTable,
    config: &AppConfig,
    store: &mut SessionStore,
) -> Result<()> {
    let mut query = String::new();
    std::io::Read::read_to_string(&mut std::io::stdin(), &mut query)?;

    let coordinator = RunCoordinator::new(api, pricing, config);
    let session = store
        .session_mut()
        .context("session was not initialized")?;
    let request = TurnRequest {
        query: query.trim(),
        model: &config.default_model,
        temperature: config.default_temperature,
        instructions: None,
    };

    match run_cycle(&coordinator, session, &request).await {
        Ok(answer) => {
            println!("{}", answer.text);
            if config.debug {
                let cost = pricing
                    .cost(
                        answer.usage.prompt_tokens,
                        answer.usage.completion_tokens,
                        &config.default_model,
                    )
                    .unwrap_or(0.0);
                chat::print_debug_panel(&answer, cost, session);
            }
            Ok(())
        }
        Err(e) => {
            report_cycle_error(&e);
            Err(e.into())
        }
    }
}

async fn run_repl(
    api: &OpenAiAssistants,
    pricing: &PricingTable,
    config: &AppConfig,
    store: &mut SessionStore,
    initial_instructions: String,
) -> Result<()> {
    let coordinator = RunCoordinator::new(api, pricing, config);

    let mut model = config.default_model.clone();
    let mut temperature = config.default_temperature;
    let mut instructions = initial_instructions;
    let mut instructions_overridden = false;
    let mut debug = config.debug;

    chat::print_banner(config);
    if let Some(session) = store.session() {
        chat::print_history(session, config);
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break, // EOF
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("✗ {msg}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => chat::print_help(),
            Command::ShowModels => chat::print_models(pricing, &model),
            Command::ShowUsage => {
                if let Some(session) = store.session() {
                    chat::print_session_usage(session);
                }
            }
            Command::ToggleDebug => {
                debug = !debug;
                println!("Debug mode {}", if debug { "on" } else { "off" });
            }
            Command::SetModel(id) => {
                if pricing.contains(&id) {
                    model = id;
                    println!("Model set to {model}");
                } else {
                    println!("✗ Unknown model: {id} (see /models)");
                }
            }
            Command::SetTemperature(value) => {
                temperature = value;
                println!("Temperature set to {temperature}");
            }
            Command::SetSystem(text) => {
                instructions = text;
                instructions_overridden = true;
                println!("Instruction override set for subsequent runs.");
            }
            Command::Query(query) => {
                let session = store
                    .session_mut()
                    .context("session was not initialized")?;
                let request = TurnRequest {
                    query: &query,
                    model: &model,
                    temperature,
                    instructions: instructions_overridden.then_some(instructions.as_str()),
                };

                println!("Fetching response...");
                match run_cycle(&coordinator, session, &request).await {
                    Ok(answer) => {
                        chat::print_turn(Role::Assistant, &answer.text, config);
                        if debug {
                            let cost = pricing
                                .cost(
                                    answer.usage.prompt_tokens,
                                    answer.usage.completion_tokens,
                                    &model,
                                )
                                .unwrap_or(0.0);
                            chat::print_debug_panel(&answer, cost, session);
                        }
                    }
                    Err(e) => report_cycle_error(&e),
                }
            }
        }
    }

    if let Some(session) = store.session() {
        println!();
        chat::print_session_usage(session);
    }

    Ok(())
}
