//! Taskboard CLI entry point.

use clap::Parser;
use taskboard::api::ApiClient;
use taskboard::cli::{Cli, Commands, ConfigCommands, TaskCommands, UserCommands};
use taskboard::commands::{self, Output, TaskListArgs};
use taskboard::config::Config;
use taskboard::gateway::TaskForm;
use taskboard::session::SessionStore;
use taskboard::Result;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    let outcome = run(cli);
    if let Err(e) = outcome {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let human = cli.human_readable;

    match cli.command {
        Commands::Login { email, password } => {
            let (client, _) = connect()?;
            output(&commands::login(&client, &email, &password)?, human);
        }
        Commands::Logout => {
            let store = SessionStore::new()?;
            output(&commands::logout(&store)?, human);
        }
        Commands::Whoami => {
            let store = SessionStore::new()?;
            output(&commands::whoami(&store), human);
        }
        Commands::Task { command } => run_task(command, human)?,
        Commands::Calendar { month, assignee } => {
            let (client, _) = connect()?;
            output(
                &commands::calendar(&client, month.as_deref(), assignee)?,
                human,
            );
        }
        Commands::User { command } => run_user(command, human)?,
        Commands::Config { command } => match command {
            ConfigCommands::Get { key } => output(&commands::config_get(&key)?, human),
            ConfigCommands::Set { key, value } => {
                output(&commands::config_set(&key, &value)?, human)
            }
            ConfigCommands::List => output(&commands::config_list()?, human),
        },
        Commands::Version => output(&commands::version(), human),
    }
    Ok(())
}

fn run_task(command: TaskCommands, human: bool) -> Result<()> {
    let (client, store) = connect()?;
    match command {
        TaskCommands::Create {
            title,
            description,
            start,
            end,
            priority,
            assignee,
        } => {
            let form = TaskForm {
                title: Some(title),
                description,
                start_date: start,
                end_date: end,
                priority,
                status: None,
                assignee,
            };
            output(&commands::task_create(&client, &store, &form)?, human);
        }
        TaskCommands::List {
            status,
            assignee,
            search,
            from,
            to,
            sort,
        } => {
            let args = TaskListArgs {
                status,
                assignee,
                search,
                from,
                to,
                sort,
            };
            output(&commands::task_list(&client, &args)?, human);
        }
        TaskCommands::Show { id } => output(&commands::task_show(&client, id)?, human),
        TaskCommands::Update {
            id,
            title,
            description,
            start,
            end,
            priority,
            status,
            assignee,
        } => {
            let form = TaskForm {
                title,
                description,
                start_date: start,
                end_date: end,
                priority,
                status,
                assignee,
            };
            output(&commands::task_update(&client, &store, id, &form)?, human);
        }
        TaskCommands::Done { id } => output(&commands::task_done(&client, id)?, human),
        TaskCommands::Delete { id } => {
            output(&commands::task_delete(&client, &store, id)?, human)
        }
    }
    Ok(())
}

fn run_user(command: UserCommands, human: bool) -> Result<()> {
    let (client, store) = connect()?;
    match command {
        UserCommands::List => output(&commands::user_list(&client, &store)?, human),
        UserCommands::Add {
            name,
            email,
            password,
            admin,
        } => output(
            &commands::user_add(&client, &store, &name, &email, &password, admin)?,
            human,
        ),
        UserCommands::Update {
            id,
            name,
            email,
            password,
            admin,
        } => output(
            &commands::user_update(
                &client,
                &store,
                id,
                name.as_deref(),
                email.as_deref(),
                password.as_deref(),
                admin,
            )?,
            human,
        ),
        UserCommands::Rm { id } => output(&commands::user_rm(&client, &store, id)?, human),
    }
    Ok(())
}

/// Build the API client and session store from resolved configuration.
fn connect() -> Result<(ApiClient, SessionStore)> {
    let config = Config::load()?;
    let store = SessionStore::new()?;
    let client = ApiClient::new(&config, store.clone());
    Ok((client, store))
}

/// Print a command result as JSON (default) or human-readable text.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
