use anyhow::Context;
use log::{error, info, warn};
use smarttext::command::{Command, parse_command_line};
use smarttext::config::SmarttextConfig;
use smarttext::editor::{Editor, EditorEvent};
use smarttext::ipc::SingleInstance;
use smarttext::lifecycle::{Lifecycle, Termination};
use smarttext::session::SessionStore;
use smarttext::settings::SettingsStore;
use smarttext::{app_dirs, cli, paths};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Application entry point: decide whether this launch is the primary
/// editor, forward file arguments and exit if it is not, otherwise restore
/// the previous session and run the command console until quit.
///
/// Commands are read line by line from stdin (`open <path>`, `new`,
/// `close [n]`, `tab <n>`, `save`, `saveas <path>`, `ls`, `quit`, ...).
/// Files forwarded by later launches are opened as they arrive. The session
/// is written back on exit, including exits requested by SIGINT, SIGTERM or
/// SIGHUP.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli_args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error parsing arguments: {}", e);
            std::process::exit(1);
        }
    };

    // Set RUST_LOG to control verbosity
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SmarttextConfig::load(cli_args.config.as_deref());
    let files = cli_args.resolved_files();

    let (instance, messages) = if cli_args.new_instance {
        info!("Running as an independent instance");
        let (_tx, rx) = mpsc::unbounded_channel();
        (None, rx)
    } else {
        let endpoint = app_dirs::endpoint_path(config.endpoint_name());
        let (instance, messages) = SingleInstance::new(endpoint);
        let mut instance =
            instance.with_timeouts(config.probe_timeout(), config.send_timeout());

        if !instance.become_primary().await {
            if forward_to_primary(&instance, &files).await {
                return Ok(());
            }
            // The primary went away between probe and send
            if !instance.become_primary().await {
                error!("Could not reach the running editor or take over from it");
                std::process::exit(1);
            }
        }
        (Some(instance), messages)
    };

    let data_dir = cli_args.data_dir.clone().unwrap_or_else(|| config.data_dir());
    let store = SessionStore::new(&data_dir);
    let mut settings = SettingsStore::open(&app_dirs::settings_path(&data_dir));
    info!(
        "Settings: font size {}, theme {}",
        settings.settings().font_size,
        settings.settings().theme
    );

    let mut editor = Editor::with_policy(config.last_tab_policy());
    if let Some(record) = store.load() {
        info!("Restoring {} tabs from {}", record.tabs.len(), store.path().display());
        editor.restore(record);
    }
    for file in &files {
        let _ = editor.open(&file.to_string_lossy());
    }

    let mut lifecycle: Lifecycle<Editor> = Lifecycle::new();
    let session_store = store.clone();
    lifecycle.on_shutdown("save session", move |editor| {
        session_store
            .save(&editor.snapshot())
            .with_context(|| format!("saving session to {}", session_store.path().display()))
    });

    let mut termination = Termination::listen().context("installing signal handlers")?;

    render(&mut editor);
    run_console(&mut editor, &mut settings, messages, &mut termination).await;

    lifecycle.shutdown(&mut editor);
    drop(instance);
    Ok(())
}

/// Send every file to the primary. With no files there is nothing to do and
/// the launch simply ends.
async fn forward_to_primary(instance: &SingleInstance, files: &[PathBuf]) -> bool {
    if files.is_empty() {
        info!("Editor already running; nothing to forward");
        return true;
    }

    for file in files {
        let Some(uri) = paths::to_file_uri(file) else {
            warn!("Skipping {}: cannot be expressed as a file URI", file.display());
            continue;
        };
        if !instance.send_message(&uri).await {
            return false;
        }
        info!("Forwarded {} to the running editor", file.display());
    }
    true
}

async fn run_console(
    editor: &mut Editor,
    settings: &mut SettingsStore,
    mut messages: mpsc::UnboundedReceiver<String>,
    termination: &mut Termination,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let should_quit = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => handle_line(editor, settings, &line),
                Ok(None) => true,
                Err(e) => {
                    warn!("Reading stdin failed: {}", e);
                    true
                }
            },
            Some(message) = messages.recv() => {
                editor.handle_forwarded(&message);
                false
            }
            signal = termination.recv() => {
                info!("Received {}, shutting down", signal);
                true
            }
        };

        render(editor);
        if should_quit {
            break;
        }
    }
}

fn handle_line(editor: &mut Editor, settings: &mut SettingsStore, line: &str) -> bool {
    let cmd = match parse_command_line(line) {
        Ok(cmd) => cmd,
        Err(e) => {
            println!("! {}", e);
            return false;
        }
    };

    let result = match cmd {
        Command::SetFontSize(size) => settings.set_font_size(size),
        Command::SetTheme(theme) => settings.set_theme(&theme),
        Command::SetShortcut(action, seq) => settings.set_shortcut(action, &seq),
        other => return editor.execute_command(other),
    };
    match result {
        Ok(true) => print_settings(settings),
        Ok(false) => {}
        Err(e) => println!("! Could not save settings: {}", e),
    }
    false
}

fn print_settings(settings: &SettingsStore) {
    let s = settings.settings();
    println!(
        "settings ({}): font {} | theme {} | new {} | open {} | save {} | save as {}",
        settings.path().display(),
        s.font_size,
        s.theme,
        s.shortcuts.new,
        s.shortcuts.open,
        s.shortcuts.save,
        s.shortcuts.save_as
    );
}

/// Stand-in for a real front end: print whatever the events say is stale.
fn render(editor: &mut Editor) {
    let events = editor.take_events();

    if events.contains(&EditorEvent::ActivateRequested) {
        println!("* activated by another launch");
    }
    if events.contains(&EditorEvent::TabListChanged)
        || events.contains(&EditorEvent::CurrentIndexChanged)
    {
        let current = editor.documents().current_index();
        for (i, title) in editor.tab_titles().iter().enumerate() {
            let marker = if i == current { '>' } else { ' ' };
            println!("{} [{}] {}", marker, i + 1, title);
        }
    }
    if events.contains(&EditorEvent::DocumentChanged) {
        let doc = editor.current();
        println!(
            "-- {} ({} chars, cursor {}) --",
            doc.display_title(),
            doc.len_chars(),
            doc.cursor()
        );
    }
    if events.contains(&EditorEvent::SaveAsRequested) {
        println!("? use `saveas <path>` to choose a file name");
    }
    if events.contains(&EditorEvent::StatusMessageChanged) {
        println!("{}", editor.status_message());
    }
}
