use std::env;
use std::process::ExitCode;

use anyhow::Result;

use koji_compose::compose::{self, ComposeClient};
use koji_compose::config::Config;
use koji_compose::repositories;

fn usage(program: &str) {
    eprintln!("usage: {program} DISTRO");
    eprintln!("known distros: {}", repositories::known_distros().join(", "));
}

async fn run(distro: &str) -> Result<()> {
    let cfg = Config::from_env()?;

    let request = compose::build_request(distro, &cfg)?;
    println!("{}", serde_json::to_string(&request)?);

    let client = ComposeClient::new(&cfg)?;
    let compose_id = client.submit(&request).await?;
    client.wait(&compose_id).await?;

    println!("Compose worked!");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        usage(&args[0]);
        return ExitCode::FAILURE;
    }

    match run(&args[1]).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
