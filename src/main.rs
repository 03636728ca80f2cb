use std::io::Read;

use serde::Deserialize;
use shellgate::config::Config;
use shellgate::eval::CommandRegistry;
use shellgate::logging;

#[derive(Deserialize)]
struct Request {
    command: String,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::load();

    if args.iter().any(|a| a == "--dump-config") {
        match toml::to_string_pretty(&config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("failed to serialize config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    logging::init(&config.logging);
    for (image, pattern, error) in config.executor.invalid_patterns() {
        log::warn!("{image}: pattern {pattern:?} does not compile and never matches: {error}");
    }

    let command = match args.iter().position(|a| a == "--check") {
        Some(i) => match args.get(i + 1) {
            Some(command) => command.clone(),
            None => {
                eprintln!("usage: shellgate [--check <command> | --dump-config]");
                std::process::exit(1);
            }
        },
        None => read_request(),
    };

    let registry = CommandRegistry::new();
    let result = registry.sanitize(&command, &config.executor);
    logging::log_decision(&command, &result);

    let output = match &result {
        Ok(safe) => serde_json::json!({
            "status": "ok",
            "command": safe,
        }),
        Err(e) => serde_json::json!({
            "status": "rejected",
            "kind": e.kind().as_str(),
            "reason": e.to_string(),
        }),
    };
    println!("{output}");
}

/// Read `{"command": "..."}` from stdin, exiting 1 if it is unreadable.
fn read_request() -> String {
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("failed to read stdin");
        std::process::exit(1);
    }
    match serde_json::from_str::<Request>(&input) {
        Ok(request) => request.command,
        Err(e) => {
            eprintln!("JSON parse error: {e}");
            std::process::exit(1);
        }
    }
}
