use std::io::{self, BufRead};
use std::path::PathBuf;

use eyre::{Result, bail};
use log::{debug, info, warn};

use subgrab::controller::Controller;
use subgrab::invidious::{DIRECTORY_URL, InvidiousClient};
use subgrab::{Error, Instance, config, shell};

mod cli;

use cli::Cli;

/// Language tried when neither the command line nor the config names one
const FALLBACK_LANG: &str = "en";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("subgrab.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("subgrab")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "\nConfig is read from: {}\nLogs are written to: {}",
        config::config_path().display(),
        log_dir().join("subgrab.log").display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = config::Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {e}");
        config::Config::default()
    });

    // CLI flags take priority over config
    let instance = cli
        .instance
        .clone()
        .or(config.default_instance.clone())
        .map(Instance::new)
        .unwrap_or_default();
    let format = cli.format.or(config.default_format).unwrap_or_default();
    let directory_url = config.directory_url.clone().unwrap_or_else(|| DIRECTORY_URL.to_string());

    if cli.verbose {
        let config_path = config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!("Instance: {instance}");
    }

    let client = InvidiousClient::new(directory_url);
    let mut controller = Controller::new(client, instance);
    controller.session_mut().set_format(format);

    if cli.instances {
        for instance in controller.load_instances().await {
            println!("{instance}");
        }
        return Ok(());
    }

    if cli.interactive {
        controller.load_instances().await;
        let stdin = io::stdin();
        return shell::run(&mut controller, stdin.lock(), io::stdout()).await;
    }

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    if urls.is_empty() {
        bail!("no URL or video ID provided\n\nUsage: subgrab <URL>\n       echo <URL> | subgrab");
    }

    for url_input in &urls {
        let url_input = url_input.trim();
        if url_input.is_empty() {
            continue;
        }
        grab(&mut controller, &cli, &config, url_input).await?;
    }

    Ok(())
}

async fn grab(controller: &mut Controller, cli: &Cli, config: &config::Config, url_input: &str) -> Result<()> {
    let tracks = match controller.search(url_input).await {
        Ok(tracks) => tracks,
        Err(Error::InvalidVideoReference(input)) => bail!(
            "could not extract video ID from: {input}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/v/ID\n  <11-character video ID>"
        ),
        Err(e) => bail!("{e}"),
    };

    if cli.list {
        for (i, track) in tracks.iter().enumerate() {
            println!("{:>3}. {} [{}]", i + 1, track.label, track.language_code);
        }
        return Ok(());
    }

    if tracks.is_empty() {
        bail!("no caption tracks available for {url_input}");
    }

    let session = controller.session_mut();
    match (&cli.lang, &config.default_lang) {
        (Some(lang), _) => {
            session.select_language(lang)?;
        }
        (None, default_lang) => {
            let lang = default_lang.as_deref().unwrap_or(FALLBACK_LANG);
            if session.select_language(lang).is_err() {
                debug!("No {lang} track, using the first one");
                session.select_track(0)?;
            }
        }
    }

    let text = controller.fetch().await?;
    let session = controller.session();

    if cli.verbose {
        if let (Some(id), Some(track)) = (session.video_id(), session.selected_track()) {
            eprintln!(
                "Video: {id}\nInstance: {}\nTrack: {} ({})\nFormat: {}",
                session.instance(),
                track.label,
                track.language_code,
                session.format(),
            );
        }
    }

    if let Some(ref path) = cli.output {
        std::fs::write(path, &text)?;
        if cli.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    }

    if let Some(ref dir) = cli.download {
        let path = controller.download(dir)?;
        if cli.verbose {
            eprintln!("Saved: {}", path.display());
        }
    }

    if cli.output.is_none() && cli.download.is_none() {
        println!("{text}");
    }

    if cli.copy {
        match controller.copy() {
            Ok(()) => eprintln!("Copied successfully"),
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}

