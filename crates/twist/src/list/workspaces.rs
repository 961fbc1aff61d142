use crate::cancel::Cancellation;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use twist_core::model::{Channel, User, Workspace};

use super::output_json;

#[derive(Debug, clap::Args, Clone)]
pub struct WorkspacesOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ChannelsOptions {
    /// Workspace ID
    #[clap(env = "TWIST_WORKSPACE")]
    pub workspace_id: u64,

    /// Include archived channels
    #[arg(short, long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct UsersOptions {
    /// Workspace ID
    #[clap(env = "TWIST_WORKSPACE")]
    pub workspace_id: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run_workspaces(
    options: WorkspacesOptions,
    global: crate::Global,
    cancel: &Cancellation,
) -> Result<()> {
    if global.verbose {
        eprintln!("Fetching workspaces...");
    }

    let client = global.config().client()?;
    let workspaces = client.workspaces(cancel).await?;

    if options.json {
        output_json(&workspaces)
    } else {
        print_workspaces(&workspaces);
        Ok(())
    }
}

pub async fn run_channels(
    options: ChannelsOptions,
    global: crate::Global,
    cancel: &Cancellation,
) -> Result<()> {
    if global.verbose {
        eprintln!("Fetching channels of workspace {}...", options.workspace_id);
    }

    let client = global.config().client()?;
    let channels = visible_channels(
        client.channels(options.workspace_id, cancel).await?,
        options.all,
    );

    if options.json {
        output_json(&channels)
    } else {
        print_channels(&channels);
        Ok(())
    }
}

pub async fn run_users(options: UsersOptions, global: crate::Global, cancel: &Cancellation) -> Result<()> {
    if global.verbose {
        eprintln!("Fetching users of workspace {}...", options.workspace_id);
    }

    let client = global.config().client()?;
    let users = client.users(options.workspace_id, cancel).await?;

    if options.json {
        output_json(&users)
    } else {
        print_users(&users);
        Ok(())
    }
}

fn visible_channels(channels: Vec<Channel>, include_archived: bool) -> Vec<Channel> {
    channels
        .into_iter()
        .filter(|c| include_archived || !c.archived)
        .collect()
}

fn print_workspaces(workspaces: &[Workspace]) {
    if workspaces.is_empty() {
        println!("{}", "No workspaces found.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["ID".bold().cyan(), "Name".bold().cyan()]);
    for ws in workspaces {
        table.add_row(prettytable::row![
            ws.id.to_string().green().to_string(),
            ws.name.bright_white().to_string()
        ]);
    }
    table.printstd();
}

fn print_channels(channels: &[Channel]) {
    if channels.is_empty() {
        println!("{}", "No channels found.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["ID".bold().cyan(), "Name".bold().cyan()]);
    for channel in channels {
        let name = if channel.archived {
            format!("{} (archived)", channel.name).bright_black().to_string()
        } else {
            channel.name.bright_white().to_string()
        };
        table.add_row(prettytable::row![channel.id.to_string().green().to_string(), name]);
    }
    table.printstd();
}

fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("{}", "No users found.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Short name".bold().cyan(),
        "Name".bold().cyan()
    ]);
    for user in users {
        table.add_row(prettytable::row![
            user.id.to_string().green().to_string(),
            user.display_name().bright_white().to_string(),
            user.name.bright_black().to_string()
        ]);
    }
    table.printstd();
}
