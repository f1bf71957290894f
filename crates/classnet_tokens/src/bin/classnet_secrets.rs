//! classnet-secrets - generate credentials for a classnet deployment.

use clap::{Parser, Subcommand};
use classnet_tokens::secrets::{hash_token, random_secret};

/// Generate fresh secrets for config files and environment variables
#[derive(Parser)]
#[command(name = "classnet-secrets")]
#[command(about = "Generate secrets for classnet", long_about = None)]
struct Cli {
    /// Entropy per secret in bytes
    #[arg(short, long, default_value_t = 32)]
    bytes: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print server secret, registration token and shared secret as env lines
    Env,

    /// Create an admin access token and the hash to put in [admin]
    #[command(name = "admin-token")]
    AdminToken {
        /// Name recorded for the administrator
        #[arg(short, long, default_value = "admin")]
        name: String,
    },

    /// Hash an existing admin access token
    Hash {
        token: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let bytes = cli.bytes.max(16);

    match cli.command.unwrap_or(Commands::Env) {
        Commands::Env => {
            println!("CLASSNET_SECRET_TOKENS_SERVER_SECRET={}", random_secret(bytes));
            println!("CLASSNET_SECRET_TOKENS_REGISTRATION_TOKEN={}", random_secret(bytes));
            println!("CLASSNET_SECRET_TOKENS_SHARED_SECRET={}", random_secret(bytes));
        }
        Commands::AdminToken { name } => {
            let token = random_secret(bytes);
            println!("# give this token to {}:", name);
            println!("{}", token);
            println!();
            println!("[[admin.access_tokens]]");
            println!("name = \"{}\"", name);
            println!("token_sha256 = \"{}\"", hash_token(&token));
            println!("classrooms = []");
        }
        Commands::Hash { token } => {
            println!("{}", hash_token(&token));
        }
    }
}
