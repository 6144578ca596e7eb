use super::commands::{
    run_filter, run_match, run_score, run_wishlist_export, run_wishlist_toggle, FilterArgs,
    MatchArgs, ScoreArgs, WishlistExportArgs, WishlistToggleArgs,
};
use super::server;
use crate::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "projet-match",
    about = "Match a project profile against funding and support offers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the diagnostic against a catalog and print the matching offers
    Match(MatchArgs),
    /// Apply the stage/need quick filter to a catalog
    Filter(FilterArgs),
    /// Score a self-assessment and list the offers it unlocks
    Score(ScoreArgs),
    /// Work with the persisted wishlist
    Wishlist {
        #[command(subcommand)]
        command: WishlistCommand,
    },
}

#[derive(Subcommand, Debug)]
enum WishlistCommand {
    /// Render the wishlist as a paginated text document
    Export(WishlistExportArgs),
    /// Add an offer to the wishlist, or remove it when already present
    Toggle(WishlistToggleArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Match(args) => run_match(args),
        Command::Filter(args) => run_filter(args),
        Command::Score(args) => run_score(args),
        Command::Wishlist {
            command: WishlistCommand::Export(args),
        } => run_wishlist_export(args),
        Command::Wishlist {
            command: WishlistCommand::Toggle(args),
        } => run_wishlist_toggle(args),
    }
}
