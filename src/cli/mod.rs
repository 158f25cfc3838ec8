pub mod commands;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "khedma-api")]
#[command(about = "Khedma API - home-services marketplace backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Listen port (overrides API_PORT / PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-process store seeded with a demo catalog")]
        memory_store: bool,
    },

    #[command(about = "Apply database migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "Create an administrator account")]
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Report a finished command. JSON output merges `data` into the envelope.
    pub fn success(self, message: &str, data: Value) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json => {
                let mut response = json!({ "success": true, "message": message });
                if let (Some(target), Value::Object(extra)) = (response.as_object_mut(), data) {
                    target.extend(extra);
                }
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            OutputFormat::Text => println!("✓ {}", message),
        }
        Ok(())
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { port, memory_store } => commands::serve::handle(port, memory_store).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::CreateAdmin {
            email,
            password,
            full_name,
        } => commands::admin::handle(email, password, full_name, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from(["khedma-api", "serve", "--port", "4100", "--memory-store"]).unwrap();
        match cli.command {
            Commands::Serve { port, memory_store } => {
                assert_eq!(port, Some(4100));
                assert!(memory_store);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn create_admin_requires_all_fields() {
        assert!(Cli::try_parse_from(["khedma-api", "create-admin", "--email", "a@x.com"]).is_err());

        let cli = Cli::try_parse_from([
            "khedma-api",
            "--json",
            "create-admin",
            "--email",
            "a@x.com",
            "--password",
            "secret1",
            "--full-name",
            "Admin",
        ])
        .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
    }
}
