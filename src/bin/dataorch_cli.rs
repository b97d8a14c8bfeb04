//! dataorch-cli: exercise the DataOrchestrator backends from a terminal
//!
//! Usage:
//!   dataorch-cli login <email> [password]          Store a credential
//!   dataorch-cli logout                            Clear the credential
//!   dataorch-cli whoami                            Show the logged-in user
//!   dataorch-cli chat <prompt> [--agent A] [--session S]
//!   dataorch-cli workflow <query> <date>           Run a data workflow
//!   dataorch-cli skills                            List skills
//!   dataorch-cli sessions                          List chat sessions
//!   dataorch-cli agents                            List agents

use anyhow::{bail, Context, Result};
use dataorch_client::{Agent, ApiClientBuilder, BackendClients, BackendRegistry, ChatReply};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "version" | "--version" | "-V" => {
            println!("dataorch-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "agents" => {
            cmd_agents();
            Ok(())
        }
        command => run(command, &args[2..]).await,
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"dataorch-cli: DataOrchestrator backend client

USAGE:
    dataorch-cli <COMMAND> [OPTIONS]

COMMANDS:
    login <email> [password]                Store a credential (no server check)
    logout                                  Clear the stored credential
    whoami                                  Show the logged-in user
    chat <prompt> [--agent A] [--session S] Send one chat turn to opencode_agent
    workflow <query> <date>                 Run a data_platform workflow
    skills                                  List skills
    sessions                                List chat sessions
    agents                                  List agents
    version                                 Show version information
    help                                    Show this help message

ENVIRONMENT:
    DATAORCH_CONFIG                         YAML registry config file
    DATAORCH_DATA_PLATFORM_URL              data_platform base URL
    DATAORCH_OPENCODE_AGENT_URL             opencode_agent base URL
    DATAORCH_DATA_PLATFORM_MOCK             1 = answer data_platform from fixtures
    DATAORCH_OPENCODE_AGENT_MOCK            1 = answer opencode_agent from fixtures
    DATAORCH_REQUEST_TIMEOUT_MS             Request deadline (default 60000)
    RUST_LOG                                Log filter (e.g. dataorch_client=info)"#
    );
}

fn clients() -> Result<BackendClients> {
    let mut builder = ApiClientBuilder::new();
    if let Ok(path) = std::env::var("DATAORCH_CONFIG") {
        let registry = BackendRegistry::from_yaml_file(&path)
            .and_then(|r| r.with_env_overrides())
            .with_context(|| format!("failed to load registry config {path}"))?;
        builder = builder.registry(registry);
    }
    Ok(builder.build_all()?)
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(command: &str, args: &[String]) -> Result<()> {
    let clients = clients()?;
    let agent = &clients.opencode_agent;

    match command {
        "login" => {
            let Some(email) = args.first() else {
                bail!("usage: dataorch-cli login <email> [password]");
            };
            let password = args.get(1).map(String::as_str).unwrap_or("");
            let resp = agent.login(email, password)?;
            println!("Logged in as {}", resp.user.email);
        }
        "logout" => {
            agent.logout()?;
            println!("Logged out");
        }
        "whoami" => match agent.current_user()? {
            Some(user) => println!("{}", user.email),
            None => println!("Not logged in"),
        },
        "chat" => {
            let Some(prompt) = args.first() else {
                bail!("usage: dataorch-cli chat <prompt> [--agent A] [--session S]");
            };
            let value = agent
                .chat(prompt, flag_value(args, "--agent"), flag_value(args, "--session"))
                .await?;
            let reply = ChatReply::from_value(&value)?;
            match reply.text() {
                Some(text) => println!("{text}"),
                None => print_json(&value)?,
            }
            for call in &reply.tool_calls {
                println!("[tool] {call}");
            }
        }
        "workflow" => {
            let (Some(query), Some(date)) = (args.first(), args.get(1)) else {
                bail!("usage: dataorch-cli workflow <query> <date>");
            };
            let value = clients
                .data_platform
                .run_workflow(query, date, Default::default())
                .await?;
            print_json(&value)?;
        }
        "skills" => print_json(&agent.list_skills().await?)?,
        "sessions" => print_json(&agent.get_sessions().await?)?,
        other => {
            print_usage();
            bail!("unknown command: {other}");
        }
    }
    Ok(())
}

fn cmd_agents() {
    for agent in Agent::all() {
        println!("{:<8} {}", agent.as_str(), agent.description());
    }
}
