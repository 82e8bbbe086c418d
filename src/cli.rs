use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "redwire",
    version,
    about = "Rate-limit aware client for the Reddit API."
)]
pub struct Cli {
    /// Log request and rate-limit details.
    #[arg(long, short, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Fetch a listing such as `r/rust/new`, `r/rust/comments/abc` or `user/spez/submitted`.
    Listing {
        #[arg(help = "Listing path", required = true)]
        path: String,

        #[arg(long, short, help = "Number of items to retrieve")]
        limit: Option<u32>,

        #[arg(long, short, help = "Fullname to page after")]
        after: Option<String>,

        #[arg(long, short, help = "Show items in a brief one-line format")]
        brief: bool,

        #[arg(
            long,
            short,
            help = "Timezone for timestamps",
            default_value = "America/Los_Angeles"
        )]
        timezone: String,
    },

    /// Show a subreddit's about page.
    About {
        #[arg(help = "Subreddit name", required = true)]
        subreddit: String,
    },

    /// Show the authenticated account.
    /// Requires REDDIT_CLIENT_ID and friends in the environment.
    Me,

    /// Submit a self post to a subreddit.
    Submit {
        #[arg(help = "Subreddit name", required = true)]
        subreddit: String,

        #[arg(help = "Post title", required = true)]
        title: String,

        #[arg(help = "Post text content", required = true)]
        text: String,

        #[arg(long, short, help = "Modhash for cookie sessions")]
        modhash: Option<String>,
    },

    /// Comment on a post or reply to a comment.
    Comment {
        /// Fullname of the parent: "t3_" for posts, "t1_" for comments.
        #[arg(help = "Thing ID to comment on (e.g., t3_abc123)", required = true)]
        thing_id: String,

        #[arg(help = "Comment text", required = true)]
        text: String,

        #[arg(long, short, help = "Modhash for cookie sessions")]
        modhash: Option<String>,
    },
}
