// ABOUTME: Plain-text presentation helpers for the chat REPL
// History rendering, the debug panel, and slash-command parsing

use crate::app::config::AppConfig;
use crate::app::coordinator::Answer;
use crate::app::session::{Role, Session};
use crate::utils::pricing::PricingTable;

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Query(String),
    SetModel(String),
    SetTemperature(f64),
    SetSystem(String),
    ToggleDebug,
    ShowModels,
    ShowUsage,
    Help,
    Quit,
}

impl Command {
    /// Parse a REPL line. Lines starting with `/` are commands; anything
    /// else is a query for the assistant.
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        if !line.starts_with('/') {
            return Ok(Command::Query(line.to_string()));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "/model" => {
                if rest.is_empty() {
                    Err("usage: /model <id>".to_string())
                } else {
                    Ok(Command::SetModel(rest.to_string()))
                }
            }
            "/temp" | "/temperature" => {
                let value: f64 = rest
                    .parse()
                    .map_err(|_| format!("not a temperature: {rest}"))?;
                if !(0.0..=2.0).contains(&value) {
                    return Err(format!("temperature {value} is outside [0.0, 2.0]"));
                }
                Ok(Command::SetTemperature(value))
            }
            "/system" => {
                if rest.is_empty() {
                    Err("usage: /system <instruction text>".to_string())
                } else {
                    Ok(Command::SetSystem(rest.to_string()))
                }
            }
            "/debug" => Ok(Command::ToggleDebug),
            "/models" => Ok(Command::ShowModels),
            "/usage" => Ok(Command::ShowUsage),
            "/help" => Ok(Command::Help),
            "/quit" | "/exit" => Ok(Command::Quit),
            other => Err(format!("unknown command: {other} (try /help)")),
        }
    }
}

fn role_label(role: Role, config: &AppConfig) -> String {
    let avatar = match role {
        Role::User => config.avatar_user.as_deref(),
        Role::Assistant => config.avatar_assistant.as_deref(),
    };
    match avatar {
        Some(avatar) => format!("{avatar} {}", role.as_str()),
        None => role.as_str().to_string(),
    }
}

pub fn print_banner(config: &AppConfig) {
    if let Some(logo) = &config.logo {
        println!("{logo}");
    }
    println!("{}", config.title);
    println!("{}", "=".repeat(config.title.len()));
    println!("Type a question, or /help for commands.");
    println!();
}

pub fn print_history(session: &Session, config: &AppConfig) {
    for turn in &session.history {
        println!("[{}] {}", role_label(turn.role, config), turn.content);
    }
}

pub fn print_turn(role: Role, content: &str, config: &AppConfig) {
    println!("[{}] {}", role_label(role, config), content);
}

pub fn print_help() {
    println!("Commands:");
    println!("  /model <id>      switch model");
    println!("  /temp <0.0-2.0>  set sampling temperature");
    println!("  /system <text>   override the instruction text");
    println!("  /debug           toggle the usage/diagnostics panel");
    println!("  /models          list models from the pricing table");
    println!("  /usage           show session totals");
    println!("  /quit            exit");
}

pub fn print_models(pricing: &PricingTable, current: &str) {
    println!("Models:");
    for model in pricing.models() {
        let marker = if model == current { "*" } else { " " };
        println!("  {marker} {model}");
    }
}

pub fn print_session_usage(session: &Session) {
    println!("Session usage:");
    println!("  - Prompt tokens:     {}", session.prompt_tokens);
    println!("  - Completion tokens: {}", session.completion_tokens);
    println!("  - Total tokens:      {}", session.total_tokens());
    println!(
        "  - Estimated cost:    {}",
        PricingTable::format_cost(session.cumulative_cost)
    );
    println!("  - Session started:   {}", session.started_at.format("%H:%M:%S"));
}

/// Per-cycle and cumulative counters plus the raw terminal run, shown
/// after each answer when debug mode is on.
pub fn print_debug_panel(answer: &Answer, cycle_cost: f64, session: &Session) {
    println!();
    println!("--- debug ---");
    println!("Usage (last prompt):");
    println!("  - Prompt tokens:     {}", answer.usage.prompt_tokens);
    println!("  - Completion tokens: {}", answer.usage.completion_tokens);
    println!("  - Total tokens:      {}", answer.usage.total_tokens);
    println!("  - Status polls:      {}", answer.poll_count);
    println!("Usage (session):");
    println!("  - Prompt tokens:     {}", session.prompt_tokens);
    println!("  - Completion tokens: {}", session.completion_tokens);
    println!("  - Total tokens:      {}", session.total_tokens());
    println!("Costs:");
    println!(
        "  - Last prompt (estimated): {}",
        PricingTable::format_cost(cycle_cost)
    );
    println!(
        "  - Session (estimated):     {}",
        PricingTable::format_cost(session.cumulative_cost)
    );
    println!("Run:");
    println!("{}", format_json(&answer.run));
    println!("Messages:");
    println!("{}", format_json(&answer.messages));
    println!("-------------");
}

fn format_json<T: serde::Serialize + std::fmt::Debug>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_text_parses_as_query() {
        assert_eq!(
            Command::parse("What is 2+2?").unwrap(),
            Command::Query("What is 2+2?".to_string())
        );
    }

    #[test]
    fn model_command_requires_argument() {
        assert_eq!(
            Command::parse("/model gpt-x").unwrap(),
            Command::SetModel("gpt-x".to_string())
        );
        assert!(Command::parse("/model").is_err());
    }

    #[test]
    fn temperature_parses_and_bounds_are_enforced() {
        assert_eq!(
            Command::parse("/temp 0.7").unwrap(),
            Command::SetTemperature(0.7)
        );
        assert!(Command::parse("/temp 2.5").is_err());
        assert!(Command::parse("/temp warm").is_err());
    }

    #[test]
    fn system_command_keeps_full_text() {
        assert_eq!(
            Command::parse("/system You are terse. Answer briefly.").unwrap(),
            Command::SetSystem("You are terse. Answer briefly.".to_string())
        );
    }

    #[test]
    fn toggles_and_aliases() {
        assert_eq!(Command::parse("/debug").unwrap(), Command::ToggleDebug);
        assert_eq!(Command::parse("/quit").unwrap(), Command::Quit);
        assert_eq!(Command::parse("/exit").unwrap(), Command::Quit);
        assert_eq!(Command::parse("/help").unwrap(), Command::Help);
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(Command::parse("/frobnicate").is_err());
    }
}
