use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    policygen_cli::run().await
}
