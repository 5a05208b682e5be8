use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "betpredict")]
#[command(about = "Sports fixture predictions from a search-grounded language model", long_about = None)]
pub struct Cli {
    /// Show debug logs (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create config.toml and providers.toml templates")]
    Init {
        /// Initialize in local directory (./.betpredict) instead of global (~/.betpredict)
        #[arg(short, long)]
        local: bool,
    },

    #[command(about = "Predict a single fixture and exit")]
    Ask {
        /// Free-text fixture query, e.g. "Real Madrid vs Liverpool"
        query: String,

        /// Print the prediction as JSON instead of the rendered card
        #[arg(long)]
        json: bool,

        /// API key, overriding providers.toml
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Use local config (./.betpredict)
        #[arg(short, long)]
        local: bool,

        /// Use global config (~/.betpredict)
        #[arg(short, long)]
        global: bool,
    },

    #[command(about = "Interactive chat session")]
    Chat {
        /// API key, overriding providers.toml
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Use local config (./.betpredict)
        #[arg(short, long)]
        local: bool,

        /// Use global config (~/.betpredict)
        #[arg(short, long)]
        global: bool,
    },

    #[command(about = "Show or clear the stored chat transcript")]
    History {
        /// Delete the transcript
        #[arg(long)]
        clear: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,

        /// Use local config (./.betpredict)
        #[arg(short, long)]
        local: bool,

        /// Use global config (~/.betpredict)
        #[arg(short, long)]
        global: bool,
    },
}
