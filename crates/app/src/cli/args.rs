pub use clap::Parser;

use url::Url;

#[derive(Parser, Debug)]
#[command(name = "shadownet")]
#[command(about = "Push data through reversible transforms into paste and file hosts")]
#[command(version)]
pub struct Args {
    /// Address of a running shadownet service
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    pub remote: Url,

    #[command(subcommand)]
    pub command: crate::Command,
}
