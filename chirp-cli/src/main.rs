//! Chirp command line client.
//!
//! # Usage
//!
//! ```bash
//! # Sign in once; the token is kept for later runs
//! chirp login ada@example.com --password secret
//!
//! # Read and post
//! chirp feed --latest
//! chirp post "hello from the terminal"
//!
//! # Point at another server
//! chirp --api-url https://chirp.example/api whoami
//! ```

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chirp_core::{Chirp, Config};
use clap::{Parser, Subcommand};

use commands::Output;

/// Chirp social client
#[derive(Parser, Debug)]
#[command(name = "chirp")]
#[command(about = "Command line client for the Chirp social network")]
#[command(version)]
struct Args {
    /// Base URL of the API (overrides CHIRP_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Path to the session database (overrides CHIRP_DATABASE_PATH)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Request timeout in seconds, 0 for none
    #[arg(long)]
    timeout: Option<u64>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        name: String,
        username: String,
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the home timeline, or every tweet with --latest
    Feed {
        #[arg(long)]
        latest: bool,
    },
    /// Show one tweet and its comments
    Show { tweet_id: String },
    /// Post a tweet
    Post { content: String },
    /// Delete one of your tweets
    Delete { tweet_id: String },
    /// Like or unlike a tweet
    Like { tweet_id: String },
    /// Comment on a tweet
    Comment { tweet_id: String, content: String },
    /// Like or unlike a comment
    LikeComment { tweet_id: String, comment_id: String },
    /// Delete one of your comments
    DeleteComment { comment_id: String },
    /// Show a profile and its tweets
    Profile { username: String },
    /// Follow or unfollow a user
    Follow { username: String },
    /// Accounts you might want to follow
    Suggestions,
    /// Change fields of your profile
    EditProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::from_env().context("reading environment")?;

    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(path) = &args.database {
        config.database_path = path.clone();
    }
    if let Some(secs) = args.timeout {
        config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chirp_core::init_logging();

    let args = Args::parse();
    let config = load_config(&args)?;
    tracing::debug!(
        api_url = %config.api_url,
        database = %config.database_path.display(),
        "Starting"
    );

    let chirp = Chirp::new(config).context("opening client")?;
    chirp.initialize().await;

    let out = Output::new(args.json);

    match args.command {
        Command::Login { email, password } => commands::auth::login(&chirp, &out, &email, &password).await,
        Command::Register {
            name,
            username,
            email,
            password,
        } => commands::auth::register(&chirp, &out, &name, &username, &email, &password).await,
        Command::Logout => commands::auth::logout(&chirp, &out),
        Command::Whoami => commands::auth::whoami(&chirp, &out),
        Command::Feed { latest } => commands::tweets::feed(&chirp, &out, latest).await,
        Command::Show { tweet_id } => commands::tweets::show(&chirp, &out, &tweet_id).await,
        Command::Post { content } => commands::tweets::post(&chirp, &out, &content).await,
        Command::Delete { tweet_id } => commands::tweets::delete(&chirp, &out, &tweet_id).await,
        Command::Like { tweet_id } => commands::tweets::like(&chirp, &out, &tweet_id).await,
        Command::Comment { tweet_id, content } => {
            commands::tweets::comment(&chirp, &out, &tweet_id, &content).await
        }
        Command::LikeComment {
            tweet_id,
            comment_id,
        } => commands::tweets::like_comment(&chirp, &out, &tweet_id, &comment_id).await,
        Command::DeleteComment { comment_id } => {
            commands::tweets::delete_comment(&chirp, &out, &comment_id).await
        }
        Command::Profile { username } => commands::users::profile(&chirp, &out, &username).await,
        Command::Follow { username } => commands::users::follow(&chirp, &out, &username).await,
        Command::Suggestions => commands::users::suggestions(&chirp, &out).await,
        Command::EditProfile {
            name,
            bio,
            location,
            website,
        } => {
            let patch = chirp_core::UserPatch {
                name,
                bio,
                location,
                website,
                ..Default::default()
            };
            commands::users::edit_profile(&chirp, &out, patch).await
        }
    }
}
