use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use kompanion_core::config::{ConfigError, ConfigFormat};
use kompanion_core::library::LibraryError;
use kompanion_core::stats::ActivityPeriod;
use kompanion_core::{Application, Error, Result, Settings, User};
use serde::Serialize;

use crate::cli::{
    BookCommand, Commands, ConfigCommand, DeviceCommand, ProgressCommand, SessionArgs,
    StatsCommand, UserCommand,
};

/// Run one command and return what should be printed on stdout.
///
/// Everything except `config show` runs inside a started application so
/// the persisted state is loaded first and saved afterwards.
pub async fn execute(command: Commands, settings: Settings) -> Result<String> {
    let command = match command {
        Commands::Config { command } => return config_command(command, &settings),
        other => other,
    };

    let mut app = Application::new(settings)?;
    app.start().await?;
    let output = dispatch(&app, command).await;
    // State is saved even when the command failed.
    let shutdown = app.shutdown().await;
    let output = output?;
    shutdown?;
    Ok(output)
}

async fn dispatch(app: &Application, command: Commands) -> Result<String> {
    match command {
        Commands::Config { command } => config_command(command, app.settings()),
        Commands::User { command } => user_command(app, command).await,
        Commands::Device { command } => device_command(app, command).await,
        Commands::Book { command } => book_command(app, command).await,
        Commands::Progress { command } => progress_command(app, command).await,
        Commands::Stats { command } => stats_command(app, command).await,
    }
}

fn config_command(command: ConfigCommand, settings: &Settings) -> Result<String> {
    match command {
        ConfigCommand::Show { format } => {
            let format = ConfigFormat::from_name(&format).ok_or_else(|| {
                ConfigError::UnsupportedFormat(PathBuf::from(format!("settings.{}", format)))
            })?;
            Ok(settings.render(format)?)
        }
    }
}

async fn session_user(app: &Application, session: &SessionArgs) -> Result<User> {
    Ok(app.auth().get_user_from_session(&session.session).await?)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Other(format!("Failed to render output: {}", e)))
}

async fn user_command(app: &Application, command: UserCommand) -> Result<String> {
    let auth = app.auth();
    match command {
        UserCommand::Register { username, password } => {
            let user = auth.register_user(&username, &password).await?;
            Ok(format!("Registered user '{}' ({})", user.username, user.id))
        }
        UserCommand::Login {
            username,
            password,
            user_agent,
            client_ip,
        } => {
            let session = auth
                .login(&username, &password, user_agent.as_deref(), client_ip.as_deref())
                .await?;
            Ok(session.session_key)
        }
        UserCommand::Logout { session } => {
            auth.logout(&session.session).await?;
            Ok("Logged out".to_string())
        }
        UserCommand::Whoami { session } => {
            let user = session_user(app, &session).await?;
            Ok(format!("{} ({})", user.username, user.id))
        }
    }
}

async fn device_command(app: &Application, command: DeviceCommand) -> Result<String> {
    let auth = app.auth();
    match command {
        DeviceCommand::Add {
            name,
            password,
            session,
        } => {
            let user = session_user(app, &session).await?;
            let device = auth.add_user_device(user.id, &name, &password).await?;
            Ok(format!("Added device '{}' ({})", device.name, device.id))
        }
        DeviceCommand::List { session } => {
            let user = session_user(app, &session).await?;
            let devices = auth.list_user_devices(user.id).await?;
            Ok(devices
                .iter()
                .map(|d| format!("{}\t{}", d.name, d.id))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        DeviceCommand::Remove { name, session } => {
            let user = session_user(app, &session).await?;
            auth.deactivate_user_device(&name, user.id).await?;
            Ok(format!("Removed device '{}'", name))
        }
        DeviceCommand::Verify {
            name,
            password,
            hashed,
        } => {
            let valid = auth.verify_device_password(&name, &password, hashed).await?;
            Ok(if valid { "valid" } else { "invalid" }.to_string())
        }
    }
}

async fn book_command(app: &Application, command: BookCommand) -> Result<String> {
    let library = app.library();
    match command {
        BookCommand::Add { file, session } => {
            let user = session_user(app, &session).await?;
            let data = fs::read(&file).map_err(|e| Error::io(e, "read", file.clone()))?;
            let filename = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            let book = library.add_book(&data, filename, user.id).await?;
            to_json(&book)
        }
        BookCommand::List { page, page_size } => {
            let (books, total) = library.list_all_books(page, page_size).await?;
            let mut lines = vec![format!("{} book(s) in library", total)];
            lines.extend(books.iter().map(|book| {
                format!(
                    "{}\t{}\t{}",
                    book.id,
                    book.title,
                    book.author.as_deref().unwrap_or("-")
                )
            }));
            Ok(lines.join("\n"))
        }
        BookCommand::Show { id } => {
            let book = library
                .get_book_details(id)
                .await?
                .ok_or(LibraryError::BookNotFound(id))?;
            to_json(&book)
        }
        BookCommand::Download { id, output } => {
            let (data, filename) = library.download_book_file(id).await?;
            let target = download_target(output.as_deref(), &filename);
            fs::write(&target, &data).map_err(|e| Error::io(e, "write", target.clone()))?;
            Ok(target.display().to_string())
        }
        BookCommand::Remove { id, session } => {
            session_user(app, &session).await?;
            library.delete_book(id).await?;
            Ok(format!("Removed book {}", id))
        }
    }
}

/// An existing directory receives the file under its download name.
fn download_target(output: Option<&Path>, filename: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(filename),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(filename),
    }
}

async fn progress_command(app: &Application, command: ProgressCommand) -> Result<String> {
    let progress = app.progress();
    match command {
        ProgressCommand::Push {
            document,
            percentage,
            device,
            detail,
            timestamp,
            session,
        } => {
            let user = session_user(app, &session).await?;
            // Registered devices are linked by id. Unknown names are tracked by name.
            let device_id = app
                .auth()
                .list_user_devices(user.id)
                .await?
                .into_iter()
                .find(|d| d.name == device)
                .map(|d| d.id);
            let timestamp = timestamp.unwrap_or_else(|| Utc::now().timestamp());
            let saved = progress
                .submit_progress(
                    user.id,
                    document,
                    percentage,
                    detail.as_deref(),
                    &device,
                    device_id,
                    timestamp,
                )
                .await?;
            to_json(&saved)
        }
        ProgressCommand::Get { document, session } => {
            let user = session_user(app, &session).await?;
            match document {
                Some(document) => match progress.get_document_progress(user.id, document).await? {
                    Some(entry) => to_json(&entry),
                    None => Ok(format!("No progress for {}", document)),
                },
                None => to_json(&progress.get_all_user_progress(user.id).await?),
            }
        }
    }
}

async fn stats_command(app: &Application, command: StatsCommand) -> Result<String> {
    let stats = app.stats();
    match command {
        StatsCommand::Summary { session } => {
            let user = session_user(app, &session).await?;
            to_json(&stats.get_user_reading_summary(user.id).await?)
        }
        StatsCommand::Top { limit, session } => {
            let user = session_user(app, &session).await?;
            to_json(&stats.get_top_books_for_user(user.id, limit).await?)
        }
        StatsCommand::Activity { period, session } => {
            let period: ActivityPeriod = period.parse()?;
            let user = session_user(app, &session).await?;
            let timeline = stats.get_user_activity_timeline(user.id, period).await?;
            Ok(timeline
                .iter()
                .map(|(key, count)| format!("{}\t{}", key, count))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}
