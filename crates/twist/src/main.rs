use crate::prelude::{eprintln, *};
use clap::Parser;

mod api;
mod cache;
mod cancel;
mod dump;
mod error;
mod list;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Read Twist workspaces, threads and conversations from the command line"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Twist OAuth2 access token
    #[clap(long, env = "TWIST_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Twist API base URL
    #[clap(long, env = "TWIST_API_BASE", global = true)]
    api_base: Option<String>,

    /// Per-request timeout in seconds
    #[clap(long, env = "TWIST_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Whether to display additional information.
    #[clap(long, env = "TWIST_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    pub fn config(&self) -> api::TwistConfig {
        api::TwistConfig::from_env().with_overrides(
            self.api_base.clone(),
            self.token.clone(),
            self.timeout,
        )
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Print a thread or conversation as plain text
    Dump(crate::dump::DumpOptions),

    /// List the workspaces you belong to
    Workspaces(crate::list::workspaces::WorkspacesOptions),

    /// List the channels of a workspace
    Channels(crate::list::workspaces::ChannelsOptions),

    /// List the members of a workspace
    Users(crate::list::workspaces::UsersOptions),

    /// List every thread of a channel
    Threads(crate::list::threads::ThreadsOptions),

    /// List the comments of a thread
    Comments(crate::list::comments::CommentsOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    let cancel = cancel::Cancellation::shared();
    cancel.cancel_on_ctrl_c();

    let result = match app.command {
        SubCommands::Dump(options) => crate::dump::run(options, app.global, &cancel).await,
        SubCommands::Workspaces(options) => {
            crate::list::workspaces::run_workspaces(options, app.global, &cancel).await
        }
        SubCommands::Channels(options) => {
            crate::list::workspaces::run_channels(options, app.global, &cancel).await
        }
        SubCommands::Users(options) => {
            crate::list::workspaces::run_users(options, app.global, &cancel).await
        }
        SubCommands::Threads(options) => crate::list::threads::run(options, app.global, &cancel).await,
        SubCommands::Comments(options) => {
            crate::list::comments::run(options, app.global, &cancel).await
        }
    };

    if let Err(err) = &result {
        if err.downcast_ref::<Error>().is_some_and(Error::is_cancelled) {
            eprintln!("interrupted");
            std::process::exit(130);
        }
    }

    result
}
