//! Riot Launcher CLI
//!
//! ```text
//! riot-launcher path get|set <exe>
//! riot-launcher accounts list|add|edit|delete|reorder
//! riot-launcher license status|verify <key>
//! riot-launcher settings show|stay-signed-in <bool>|typing-delay <ms>
//! riot-launcher launch <account-id> <product>
//! ```
//!
//! 결과는 UI 페이로드와 같은 JSON으로 stdout에 출력합니다.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use launcher_lib::commands;
use launcher_lib::models::{Account, AccountPatch, LaunchRequest, NewAccount};
use launcher_lib::{AppState, CommandResult};

#[derive(Parser, Debug)]
#[command(
    name = "riot-launcher",
    version,
    about = "Switch between Riot accounts and sign in automatically",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Riot Client executable path.
    Path {
        #[command(subcommand)]
        command: PathCommand,
    },

    /// Manage stored accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommand,
    },

    /// Premium license.
    License {
        #[command(subcommand)]
        command: LicenseCommand,
    },

    /// Launch preferences.
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Restart the Riot Client and sign in with an account.
    Launch {
        account_id: String,
        /// Product id, e.g. `valorant` or `league_of_legends`.
        product: String,
    },
}

#[derive(Subcommand, Debug)]
enum PathCommand {
    Get,
    Set { path: String },
}

#[derive(Subcommand, Debug)]
enum AccountsCommand {
    List,
    Add(AddArgs),
    Edit(EditArgs),
    Delete { id: String },
    /// Store accounts in the given id order.
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long)]
    rank: Option<String>,
}

#[derive(Args, Debug)]
struct EditArgs {
    id: String,
    #[arg(long)]
    username: Option<String>,
    /// Leave out to keep the current password.
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    display_name: Option<String>,
    #[arg(long)]
    rank: Option<String>,
}

#[derive(Subcommand, Debug)]
enum LicenseCommand {
    Status,
    Verify { key: String },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    StaySignedIn {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    TypingDelay { ms: u64 },
}

fn print_json<T: Serialize>(result: CommandResult<T>) -> Result<()> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            Err(anyhow::anyhow!(err))
        }
    }
}

/// id 목록 순서대로 기존 계정을 재배열. 빠진 계정은 뒤에 원래 순서로 붙임
fn order_by_ids(current: Vec<Account>, ids: &[String]) -> Result<Vec<Account>> {
    let mut remaining = current;
    let mut ordered = Vec::with_capacity(remaining.len());
    for id in ids {
        let idx = remaining
            .iter()
            .position(|acc| &acc.id == id)
            .with_context(|| format!("unknown account id: {id}"))?;
        ordered.push(remaining.remove(idx));
    }
    ordered.extend(remaining);
    Ok(ordered)
}

async fn run(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Path { command } => match command {
            PathCommand::Get => print_json(commands::config::get_riot_path(state)),
            PathCommand::Set { path } => print_json(commands::config::set_riot_path(state, path)),
        },
        Commands::Accounts { command } => match command {
            AccountsCommand::List => print_json(commands::accounts::get_accounts(state)),
            AccountsCommand::Add(args) => {
                let account = NewAccount {
                    display_name: args.display_name,
                    username: args.username,
                    secret: args.password,
                    rank: args.rank,
                };
                print_json(commands::accounts::add_account(state, account).await)
            }
            AccountsCommand::Edit(args) => {
                let patch = AccountPatch {
                    id: args.id,
                    display_name: args.display_name,
                    username: args.username,
                    secret: args.password,
                    rank: args.rank,
                };
                print_json(commands::accounts::edit_account(state, patch).await)
            }
            AccountsCommand::Delete { id } => {
                print_json(commands::accounts::delete_account(state, id).await)
            }
            AccountsCommand::Reorder { ids } => {
                let current = state.vault.list().context("failed to read accounts")?;
                let ordered = order_by_ids(current, &ids)?;
                print_json(commands::accounts::reorder_accounts(state, ordered).await)
            }
        },
        Commands::License { command } => match command {
            LicenseCommand::Status => print_json(commands::license::get_license_status(state).await),
            LicenseCommand::Verify { key } => {
                print_json(commands::license::verify_license(state, key).await)
            }
        },
        Commands::Settings { command } => match command {
            SettingsCommand::Show => print_json(commands::settings::get_settings(state).await),
            SettingsCommand::StaySignedIn { enabled } => {
                print_json(commands::settings::set_stay_signed_in(state, enabled))
            }
            SettingsCommand::TypingDelay { ms } => {
                print_json(commands::settings::set_typing_delay(state, ms))
            }
        },
        Commands::Launch {
            account_id,
            product,
        } => {
            let request = LaunchRequest {
                account_id,
                product_id: product,
            };
            print_json(commands::launch::launch_game(state, request).await)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    launcher_lib::init_tracing();
    let cli = Cli::parse();

    let state = launcher_lib::bootstrap()
        .await
        .context("failed to start launcher session")?;
    run(&state, cli.command).await
}
