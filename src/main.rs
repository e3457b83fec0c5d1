use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
  flextrack_lib::init_tracing();

  let cli = flextrack_lib::cli::Cli::parse();
  match flextrack_lib::run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("Error: {}", e);
      ExitCode::FAILURE
    }
  }
}
