use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "mockservice-cli")]
#[command(about = "Call services on a running mockservice", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8181")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a service by path (e.g. `user/list`)
    Call {
        path: String,

        /// JSON params passed as `param`
        #[arg(short, long)]
        param: Option<String>,

        /// Send path and param as a form body instead of the query string
        #[arg(long)]
        post: bool,

        /// URL prefix of a project location (e.g. `/get`)
        #[arg(long, default_value = "/")]
        location: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Call {
            path,
            param,
            post,
            location,
        } => {
            if let Some(param) = &param {
                serde_json::from_str::<Value>(param)
                    .map_err(|e| format!("--param is not valid JSON: {}", e))?;
            }

            let url = format!("{}{}", cli.url.trim_end_matches('/'), location);
            let mut fields = vec![("path", path)];
            if let Some(param) = param {
                fields.push(("param", param));
            }

            let res = if post {
                client.post(url).form(&fields).send().await?
            } else {
                client.get(url).query(&fields).send().await?
            };
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: mockservice returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
