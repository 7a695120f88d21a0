//! CPT coding agent binary.

mod cli;

use clap::Parser;
use cpt_service::CodingAgent;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Args, Command};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.agent_config()?;
    let agent = CodingAgent::from_config(&config)?;

    match args.cmd {
        Command::Search(cmd) => print_json(&agent.search(&cmd.query, cmd.limit)),
        Command::Analyze(cmd) => print_json(&agent.analyze_procedure(&cmd.procedure, cmd.codes)),
        Command::Validate { code } => print_json(&agent.validate(&code)),
        Command::Details { code } => print_json(&agent.get_details(&code)?),
        Command::Category { name } => print_json(&agent.category_codes(&name)),
        Command::Tips { code, procedure } => print_json(&agent.coding_tips(&code, &procedure)),
        Command::Rules => print_json(&agent.rule_descriptions()),
        Command::Health => print_json(&agent.health()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
