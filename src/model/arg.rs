use clap::Parser;

/// Vertex portfolio backend: CMS OAuth gate and portfolio API
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,
}
