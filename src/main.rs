mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use log::{debug, error};
use redwire::config::AppConfig;
use redwire::operations::{about, comment, feed, identity, submit};
use redwire::RedditClient;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = AppConfig::load();
    let client = match config.create_client() {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to create Reddit client: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let result = run(cli.command, client.clone()).await;

    let rate = client.rate();
    debug!(
        "Rate limit: {} remaining, {} used, resets at {:?}",
        rate.remaining, rate.used, rate.reset
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, client: RedditClient) -> redwire::Result<()> {
    match command {
        Commands::Listing {
            path,
            limit,
            after,
            brief,
            timezone,
        } => {
            let options = feed::FeedOptions {
                path,
                limit,
                after,
                brief,
                timezone,
            };
            feed::handle_feed_command(options, client).await
        }
        Commands::About { subreddit } => about::handle_about_command(subreddit, client).await,
        Commands::Me => identity::handle_identity_command(client).await,
        Commands::Submit {
            subreddit,
            title,
            text,
            modhash,
        } => {
            let options = submit::SubmitOptions {
                subreddit,
                title,
                text,
                modhash,
            };
            submit::handle_submit_command(options, client).await
        }
        Commands::Comment {
            thing_id,
            text,
            modhash,
        } => {
            let options = comment::CommentOptions {
                thing_id,
                text,
                modhash,
            };
            comment::handle_comment_command(options, client).await
        }
    }
}
