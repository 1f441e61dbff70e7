use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    backend_from_settings, load_settings, IntoOutcome, NewTodo, SessionController, TodoFilter,
    TodoList, Typewriter,
};
use shared::{
    domain::{Credentials, Priority, ProfilePatch, RegistrationDraft, DEMO_EMAIL, DEMO_PASSWORD},
    protocol::OperationOutcome,
    validation::{
        check_date, check_datetime, check_time, validate_email, validate_password,
        validate_phone, validate_registration, validate_resident_id, validate_username,
        ValidationError,
    },
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "learner", about = "Drive the learner session controller from a terminal")]
struct Cli {
    /// Talk to a real auth endpoint instead of the simulated backend.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Settings file; defaults to ./learner.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long, default_value = DEMO_EMAIL)]
        email: String,
        #[arg(long, default_value = DEMO_PASSWORD)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Login, rename, logout; prints every outcome.
    Walkthrough {
        #[arg(long, default_value = DEMO_EMAIL)]
        email: String,
        #[arg(long, default_value = DEMO_PASSWORD)]
        password: String,
        #[arg(long, default_value = "Learner")]
        first_name: String,
    },
    Todo {
        #[arg(long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,
        /// Add an item on top of the samples before listing.
        #[arg(long)]
        add: Option<String>,
        #[arg(long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
    },
    Validate {
        #[arg(value_enum)]
        kind: ValueKind,
        value: String,
    },
    /// Animate phrases in the terminal, typing and erasing each in turn.
    Typewriter {
        /// Keep cycling instead of stopping on the last phrase.
        #[arg(long = "loop")]
        looping: bool,
        #[arg(required = true)]
        phrases: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for TodoFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => TodoFilter::All,
            FilterArg::Active => TodoFilter::Active,
            FilterArg::Completed => TodoFilter::Completed,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ValueKind {
    Email,
    Password,
    Username,
    Phone,
    ResidentId,
    Date,
    Time,
    Datetime,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Todo {
            filter,
            add,
            priority,
        } => list_todos(filter.into(), add, priority.into()),
        Command::Validate { kind, value } => {
            check_value(kind, &value).with_context(|| format!("{value:?} failed the {kind:?} check"))?;
            println!("valid");
            Ok(())
        }
        Command::Typewriter { looping, phrases } => {
            animate(Typewriter::new(phrases).looping(looping)).await
        }
        Command::Login { email, password } => {
            if !validate_email(&email) {
                bail!(ValidationError::InvalidEmail);
            }
            let controller = controller(cli.server_url, cli.config.as_deref())?;
            let outcome = controller
                .login(&Credentials::new(email, password))
                .await
                .into_outcome();
            print_outcome("login", &outcome)
        }
        Command::Register {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let draft = RegistrationDraft {
                email,
                username,
                password,
                first_name,
                last_name,
            };
            validate_registration(&draft)?;
            let controller = controller(cli.server_url, cli.config.as_deref())?;
            let outcome = controller.register(&draft).await.into_outcome();
            print_outcome("register", &outcome)
        }
        Command::Walkthrough {
            email,
            password,
            first_name,
        } => {
            let controller = controller(cli.server_url, cli.config.as_deref())?;
            walkthrough(&controller, Credentials::new(email, password), first_name).await
        }
    }
}

fn controller(server_url: Option<String>, config: Option<&std::path::Path>) -> Result<SessionController> {
    let mut settings = load_settings(config)?;
    if server_url.is_some() {
        settings.server_url = server_url;
    }
    Ok(SessionController::new(backend_from_settings(&settings)?))
}

async fn walkthrough(
    controller: &SessionController,
    credentials: Credentials,
    first_name: String,
) -> Result<()> {
    let login = controller.login(&credentials).await.into_outcome();
    print_outcome("login", &login)?;
    if !login.success {
        return Ok(());
    }

    let patch = ProfilePatch {
        first_name: Some(first_name),
        ..ProfilePatch::default()
    };
    print_outcome("update_user", &controller.update_user(&patch).await.into_outcome())?;
    print_outcome("logout", &controller.logout().await.into_outcome())?;

    let session = controller.snapshot();
    info!(phase = ?session.phase(), "walkthrough finished");
    Ok(())
}

fn print_outcome(step: &str, outcome: &OperationOutcome) -> Result<()> {
    println!("{step}: {}", serde_json::to_string(outcome)?);
    Ok(())
}

async fn animate(typewriter: Typewriter) -> Result<()> {
    let mut out = io::stdout();
    for frame in typewriter {
        write!(out, "\r\x1b[2K{}", frame.text)?;
        out.flush()?;
        tokio::time::sleep(frame.delay).await;
    }
    writeln!(out)?;
    Ok(())
}

fn list_todos(filter: TodoFilter, add: Option<String>, priority: Priority) -> Result<()> {
    let mut todos = TodoList::with_samples();
    if let Some(title) = add {
        todos.add(NewTodo {
            title,
            description: String::new(),
            priority,
        })?;
    }

    for item in todos.filtered(filter) {
        let mark = if item.completed { "x" } else { " " };
        match &item.description {
            Some(description) => println!(
                "[{mark}] {} ({}) - {description}",
                item.title,
                item.priority.label()
            ),
            None => println!("[{mark}] {} ({})", item.title, item.priority.label()),
        }
    }
    println!("{}/{} completed", todos.completed_count(), todos.len());
    Ok(())
}

fn check_value(kind: ValueKind, value: &str) -> Result<()> {
    let ok = match kind {
        ValueKind::Email => validate_email(value),
        ValueKind::Password => validate_password(value),
        ValueKind::Username => validate_username(value),
        ValueKind::Phone => validate_phone(value),
        ValueKind::ResidentId => {
            validate_resident_id(value)?;
            true
        }
        ValueKind::Date => check_date(value),
        ValueKind::Time => check_time(value),
        ValueKind::Datetime => check_datetime(value),
    };
    if !ok {
        bail!("invalid {kind:?}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
