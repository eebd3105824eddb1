//! pw - Pagewright CLI entry point.

use pagewright::ui::output;

#[tokio::main]
async fn main() {
    if let Err(e) = pagewright::cli::run().await {
        output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
