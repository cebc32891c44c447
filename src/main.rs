use anyhow::Context;
use bad_path::{
    cli::{self, EXIT_USAGE, USAGE},
    config::Config,
    logging, server,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let cfg = match path {
        Some(p) => Config::load(p).with_context(|| format!("loading config {}", p.display()))?,
        None => Config::default(),
    };
    cfg.validate().context("validating config")?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();

    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };
    let cfg = load_config(args.config_path.as_ref())?;

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    match args.command.as_str() {
        "list" => Ok(ExitCode::from(cli::list(&cfg.classifier(), &mut stdout)?)),
        "check" => {
            let code = cli::check(&cfg.classifier(), &args.paths, args.strict, &mut stdout, &mut stderr)?;
            Ok(ExitCode::from(code))
        }
        "serve" => {
            cfg.validate_server().context("validating server config")?;
            info!(
                addr = %format!("{}:{}", cfg.server.bind_addr, cfg.server.port),
                base_path = %cfg.server.base_path,
                "bad-path ready"
            );
            server::serve(cfg).await?;
            Ok(ExitCode::SUCCESS)
        }
        other => {
            eprintln!("unknown command '{other}'\n{USAGE}");
            Ok(ExitCode::from(EXIT_USAGE))
        }
    }
}
