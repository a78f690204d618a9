use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "modal-surface", version, about = "Modal overlay dialogs in the terminal")]
pub struct Args {
    /// Theme name (e.g., "Catppuccin Latte", "Terminal")
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Rows kept below the modal area for the status bar
    #[arg(short, long)]
    pub reserve_rows: Option<u16>,
}
