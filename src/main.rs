mod logging;

use clap::Parser;
use notecomb::config::{JsonFileStorage, Preferences, RcLoader};
use notecomb::controller::{Editor, Session};
use notecomb::instance::{Handoff, InstanceLock, Mailbox, hand_off};
use notecomb::view::View;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::PathBuf;

const APP_NAME: &str = "notecomb";

#[derive(Parser, Debug)]
#[command(name = "notecomb", version, about = "Edit plain-text notes through a live line filter")]
struct Args {
    /// Files to open; the first is edited, the rest go to a running instance
    files: Vec<PathBuf>,

    /// Apply this filter after opening
    #[arg(short, long)]
    search: Option<String>,

    /// Read commands from a file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Use this rc file instead of looking for .notecombrc
    #[arg(long)]
    rc: Option<PathBuf>,

    /// Print a sample .notecombrc and exit
    #[arg(long)]
    sample_rc: bool,

    /// Remove a lock left behind by an instance that did not exit cleanly
    #[arg(long)]
    break_lock: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let args = Args::parse();

    if args.sample_rc {
        print!("{}", RcLoader::generate_sample_rc());
        return Ok(());
    }

    let rc = match &args.rc {
        Some(path) => RcLoader::load_from(path),
        None => RcLoader::load_config(),
    };

    let lock_path = InstanceLock::path_for_user(APP_NAME);
    if args.break_lock {
        InstanceLock::break_stale(&lock_path)?;
    }
    let lock = InstanceLock::acquire(&lock_path)?;
    let mailbox = Mailbox::for_user(APP_NAME);

    match hand_off(lock.as_ref(), &mailbox, &args.files)? {
        Handoff::Run => {}
        Handoff::Delivered => {
            println!("Sent {} file(s) to the running instance", args.files.len());
            return Ok(());
        }
        Handoff::Busy => {
            eprintln!("The running instance has not taken its previous request yet");
            return Ok(());
        }
    }

    let mut files = args.files.iter();
    let first = files.next();
    for ignored in files {
        tracing::warn!(path = %ignored.display(), "one document at a time; ignoring");
    }

    let mut session = Session::new(load_preferences(), rc);
    println!("{}", session.start(first.map(PathBuf::as_path))?);
    if let Some(query) = &args.search {
        session.document_mut().search(query)?;
    }

    let mut view = View::new();
    view.set_use_color(io::stdout().is_terminal());

    match &args.script {
        Some(script) => run(session, view, BufReader::new(File::open(script)?), mailbox)?,
        None => run(session, view, io::stdin().lock(), mailbox)?,
    }

    drop(lock);
    Ok(())
}

fn run<R: BufRead>(
    session: Session,
    view: View,
    input: R,
    mailbox: Mailbox,
) -> io::Result<()> {
    Editor::new(session, view, input, io::stdout().lock())
        .with_mailbox(mailbox)
        .run()
}

fn load_preferences() -> Preferences {
    let Some(path) = JsonFileStorage::default_path() else {
        return Preferences::in_memory();
    };
    match Preferences::load(Box::new(JsonFileStorage::new(&path))) {
        Ok(preferences) => preferences,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not load preferences; using defaults");
            Preferences::in_memory()
        }
    }
}
