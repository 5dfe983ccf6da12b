// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Decode, Fetch, Health, Pipeline, Serve, Upload};

command_enum! {
    (Serve, Serve),
    (Pipeline, Pipeline),
    (Upload, Upload),
    (Fetch, Fetch),
    (Decode, Decode),
    (Health, Health),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let ctx = match cli::op::OpContext::new(args.remote) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
