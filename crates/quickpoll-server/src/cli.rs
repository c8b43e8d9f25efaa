use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "quickpoll-server", version, about = "QuickPoll voting server")]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "quickpoll.toml")]
    pub config: String,

    /// Address to bind, overriding the configuration file
    #[arg(long)]
    pub bind: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}
