use std::cell::RefCell;

use clap::Parser;
use sos_core::{GameConfig, InputMode};

pub const DEFAULT_API_BASE: &str = "/api/v1";
pub const DEFAULT_RANK_LIMIT: u32 = 100;
const PUSH_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Base URL of the ranking API
    #[arg(long = "api", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// WebSocket URL of the ranking push channel, derived from the page when omitted
    #[arg(long = "push")]
    push_url: Option<String>,

    /// How many standings rows to request
    #[arg(long, default_value_t = DEFAULT_RANK_LIMIT)]
    rank_limit: u32,

    /// Play with the short 3 second hint
    #[arg(long)]
    classic: bool,

    /// Swap tiles by dragging instead of tapping twice
    #[arg(long)]
    drag: bool,
}

/// Runtime settings of the web client.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub log_level: Option<log::Level>,
    pub seed: Option<u64>,
    pub api_base: String,
    pub push_url: Option<String>,
    pub rank_limit: u32,
    pub game: GameConfig,
    pub input: InputMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some(log::Level::Error),
            seed: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            push_url: None,
            rank_limit: DEFAULT_RANK_LIMIT,
            game: GameConfig::standard(),
            input: InputMode::tap(),
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            log_level: args.verbose.log_level(),
            seed: args.seed,
            api_base: args.api_base,
            push_url: args.push_url,
            rank_limit: args.rank_limit,
            game: if args.classic {
                GameConfig::classic()
            } else {
                GameConfig::standard()
            },
            input: if args.drag {
                InputMode::drag()
            } else {
                InputMode::tap()
            },
        }
    }
}

impl Config {
    /// Parses the arguments packed into a location hash, e.g. `#-vv&--seed=42`.
    pub fn from_hash(hash: &str) -> Result<Self, clap::Error> {
        Args::try_parse_from(hash.split(['#', '&'])).map(Self::from)
    }

    /// Push channel URL, built from the page location unless one was given.
    pub fn push_url_for(&self, protocol: &str, host: &str) -> String {
        if let Some(url) = &self.push_url {
            return url.clone();
        }
        let scheme = if protocol == "https:" { "wss" } else { "ws" };
        format!("{scheme}://{host}{PUSH_PATH}")
    }
}

thread_local! {
    static CURRENT: RefCell<Config> = RefCell::new(Config::default());
}

pub(crate) fn install(config: Config) {
    CURRENT.with(|current| *current.borrow_mut() = config);
}

pub(crate) fn current() -> Config {
    CURRENT.with(|current| current.borrow().clone())
}
