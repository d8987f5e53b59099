use std::io::{BufRead, Write};
use std::path::PathBuf;

use eyre::Result;
use log::debug;

use crate::controller::Controller;
use crate::{CaptionFormat, Instance};

pub const HELP: &str = "\
commands:
  instances            list selectable instances (refreshes from the directory)
  instance <name>      switch instance
  search <url|id>      list caption tracks for a video
  tracks               show the caption tracks of the last search
  select <n|lang>      select a track by number or language code
  fetch                fetch the selected track
  format <txt|vtt>     switch display format
  show                 print the fetched caption
  copy                 copy the caption to the clipboard
  download [dir]       save the caption as <videoId>.<format>
  reset                clear the current search
  reset-all            clear the current search and input
  status               show session state
  help                 show this help
  quit                 leave the shell";

/// One line of shell input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Instances,
    Instance(String),
    Search(String),
    Tracks,
    Select(String),
    Fetch,
    Format(CaptionFormat),
    Show,
    Copy,
    Download(Option<PathBuf>),
    Reset,
    ResetAll,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse a shell line; `Ok(None)` for blank lines
    pub fn parse(line: &str) -> std::result::Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let arg = |name: &str| {
            if rest.is_empty() {
                Err(format!("usage: {name} <{}>", arg_name(name)))
            } else {
                Ok(rest.to_string())
            }
        };

        let cmd = match word.to_ascii_lowercase().as_str() {
            "instances" => Command::Instances,
            "instance" => Command::Instance(arg("instance")?),
            "search" => Command::Search(arg("search")?),
            "tracks" => Command::Tracks,
            "select" => Command::Select(arg("select")?),
            "fetch" => Command::Fetch,
            "format" => Command::Format(arg("format")?.parse()?),
            "show" => Command::Show,
            "copy" => Command::Copy,
            "download" => Command::Download((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "reset" => Command::Reset,
            "reset-all" => Command::ResetAll,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command: {other} (try 'help')")),
        };
        Ok(Some(cmd))
    }
}

fn arg_name(command: &str) -> &'static str {
    match command {
        "instance" => "name",
        "search" => "url|id",
        "select" => "n|lang",
        "format" => "txt|vtt",
        _ => "arg",
    }
}

/// Read commands from `input` until EOF or `quit`, writing results to `out`
pub async fn run<R: BufRead, W: Write>(controller: &mut Controller, input: R, mut out: W) -> Result<()> {
    writeln!(out, "instance: {} (type 'help' for commands)", controller.session().instance())?;

    for line in input.lines() {
        let line = line?;
        let cmd = match Command::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                writeln!(out, "{msg}")?;
                continue;
            }
        };

        debug!("Shell command: {cmd:?}");
        if cmd == Command::Quit {
            break;
        }
        execute(controller, cmd, &mut out).await?;
    }

    Ok(())
}

/// Run one command. Session errors are printed, only output errors are returned.
pub async fn execute<W: Write>(controller: &mut Controller, cmd: Command, out: &mut W) -> Result<()> {
    match cmd {
        Command::Instances => {
            let current = controller.session().instance().clone();
            for instance in controller.load_instances().await {
                let marker = if *instance == current { "*" } else { " " };
                writeln!(out, "{marker} {instance}")?;
            }
        }
        Command::Instance(name) => {
            controller.session_mut().select_instance(Instance::new(name));
            writeln!(out, "instance: {}", controller.session().instance())?;
        }
        Command::Search(input) => match controller.search(&input).await.map(|_| ()) {
            Ok(()) => write_tracks(controller, out)?,
            Err(e) => writeln!(out, "{e}")?,
        },
        Command::Tracks => write_tracks(controller, out)?,
        Command::Select(choice) => {
            let session = controller.session_mut();
            let selected = match choice.parse::<usize>() {
                Ok(n) if n > 0 => session.select_track(n - 1),
                _ => session.select_language(&choice),
            };
            match selected {
                Ok(track) => writeln!(out, "selected: {} ({})", track.label, track.language_code)?,
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        Command::Fetch => match controller.fetch().await {
            Ok(text) => writeln!(out, "{text}")?,
            Err(e) => writeln!(out, "{e}")?,
        },
        Command::Format(format) => {
            controller.session_mut().set_format(format);
            writeln!(out, "format: {format}")?;
        }
        Command::Show => match controller.session().display() {
            Some(text) => writeln!(out, "{text}")?,
            None => writeln!(out, "{}", controller.session().notice().unwrap_or("nothing fetched yet"))?,
        },
        Command::Copy => match controller.copy() {
            Ok(()) => writeln!(out, "copied successfully")?,
            Err(e) => writeln!(out, "{e}")?,
        },
        Command::Download(dir) => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            match controller.download(&dir) {
                Ok(path) => writeln!(out, "saved: {}", path.display())?,
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        Command::Reset => {
            controller.session_mut().reset();
            writeln!(out, "reset")?;
        }
        Command::ResetAll => {
            controller.session_mut().reset_all();
            writeln!(out, "reset")?;
        }
        Command::Status => {
            let session = controller.session();
            writeln!(out, "instance: {}", session.instance())?;
            writeln!(out, "state:    {}", session.phase())?;
            writeln!(out, "format:   {}", session.format())?;
            if let Some(id) = session.video_id() {
                writeln!(out, "video:    {id}")?;
            }
            if let Some(track) = session.selected_track() {
                writeln!(out, "track:    {} ({})", track.label, track.language_code)?;
            }
            if let Some(notice) = session.notice() {
                writeln!(out, "notice:   {notice}")?;
            }
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn write_tracks<W: Write>(controller: &Controller, out: &mut W) -> Result<()> {
    let session = controller.session();
    match session.catalog() {
        Some([]) => writeln!(out, "no caption tracks for this video")?,
        Some(tracks) => {
            for (i, track) in tracks.iter().enumerate() {
                writeln!(out, "{:>3}. {} [{}]", i + 1, track.label, track.language_code)?;
            }
        }
        None => writeln!(out, "{}", session.notice().unwrap_or("no caption list yet"))?,
    }
    Ok(())
}
