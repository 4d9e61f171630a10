//! Acadex CLI — upload study materials and attach them to notes.
//!
//! Set CLOUDINARY_CLOUD_NAME / CLOUDINARY_UPLOAD_PRESET / CLOUDINARY_FOLDER
//! for the upload endpoint and ACADEX_API_URL (or API_URL) for the notes API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use acadex_api_client::ApiClient;
use acadex_cli::{candidate_from_path, collect_dir_candidates, init_tracing};
use acadex_core::config::UploadConfig;
use acadex_core::models::{CreateNoteRequest, NoticeKind};
use acadex_core::format_bytes;
use acadex_upload::{CloudinaryTransport, EntryStatus, FileCandidate, UploadQueue};

#[derive(Parser)]
#[command(name = "acadex", about = "Acadex note-upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files and/or a folder to storage and print the queue outcome
    Upload {
        /// Paths of individual files to upload
        files: Vec<PathBuf>,
        /// Directory to upload recursively (keeps relative paths)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Upload files, then save a note referencing the uploaded assets
    SaveNote {
        /// Paths of individual files to upload
        files: Vec<PathBuf>,
        /// Directory to upload recursively (keeps relative paths)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Note title
        #[arg(long)]
        title: String,
        /// Course id the note belongs to
        #[arg(long)]
        course: String,
        /// Note description
        #[arg(long, default_value = "")]
        description: String,
        /// Classroom code, when saving into a classroom
        #[arg(long)]
        class_code: Option<String>,
    },
    /// List courses, optionally scoped to a classroom code
    Courses {
        #[arg(long)]
        class_code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Upload { files, dir } => {
            let mut queue = build_queue()?;
            run_uploads(&mut queue, &files, dir.as_deref()).await?;
            Ok(())
        }
        Commands::SaveNote {
            files,
            dir,
            title,
            course,
            description,
            class_code,
        } => {
            if title.trim().is_empty() {
                anyhow::bail!("Title is required");
            }

            let client = ApiClient::from_env()?;
            let courses = client
                .list_courses(class_code.as_deref())
                .await
                .context("Could not load courses")?;
            let course = ApiClient::find_course(&courses, &course)
                .with_context(|| format!("Unknown course id: {}", course))?
                .clone();

            let mut queue = build_queue()?;
            run_uploads(&mut queue, &files, dir.as_deref()).await?;

            let assets = queue.successful_assets();
            if assets.is_empty() {
                anyhow::bail!("Please upload at least one file before saving the note.");
            }

            let note =
                CreateNoteRequest::new(&title, &course, &description, assets, class_code);
            client.create_note(&note).await?;
            println!("Note \"{}\" saved with {} attachment(s).", note.title, note.attachments.len());
            Ok(())
        }
        Commands::Courses { class_code } => {
            let client = ApiClient::from_env()?;
            let courses = client.list_courses(class_code.as_deref()).await?;
            if courses.is_empty() {
                println!("No courses found.");
            }
            for course in courses {
                println!("{}  {}", course.id, course.title);
            }
            Ok(())
        }
    }
}

fn build_queue() -> Result<UploadQueue> {
    let config = UploadConfig::from_env()?;
    let transport = Arc::new(CloudinaryTransport::new(&config));
    Ok(UploadQueue::new(config, transport))
}

/// Admit the selections, run the batch, print the outcome. Fails if nothing
/// was admitted or any entry ended in error.
async fn run_uploads(
    queue: &mut UploadQueue,
    files: &[PathBuf],
    dir: Option<&std::path::Path>,
) -> Result<()> {
    let mut file_candidates: Vec<FileCandidate> = Vec::new();
    for path in files {
        file_candidates.push(candidate_from_path(path, None)?);
    }
    if let Some(notice) = queue.add_files(file_candidates, "files") {
        println!("{}", notice.text);
    }

    if let Some(dir) = dir {
        let folder_candidates = collect_dir_candidates(dir)?;
        if let Some(notice) = queue.add_files(folder_candidates, "folder") {
            println!("{}", notice.text);
        }
    }

    if queue.is_empty() {
        anyhow::bail!("No files were admitted to the upload queue.");
    }

    let notice = queue.upload_all().await;
    print_summary(queue);
    println!("{}", notice.text);

    if notice.kind == NoticeKind::Error {
        anyhow::bail!("Upload batch finished with failures.");
    }
    Ok(())
}

fn print_summary(queue: &UploadQueue) {
    let snapshot = queue.snapshot();
    for entry in &snapshot.entries {
        let state = match &entry.status {
            EntryStatus::Pending => "waiting".to_string(),
            EntryStatus::Uploading { progress } => format!("uploading {}%", progress),
            EntryStatus::Success(asset) => format!("done -> {}", asset.secure_url),
            EntryStatus::Error(message) => format!("failed: {}", message),
        };
        println!(
            "  {} ({})  {}",
            entry.display_name(),
            format_bytes(entry.size_bytes),
            state
        );
    }
    let stats = snapshot.stats;
    println!(
        "{} total, {} done, {} failed, {}",
        stats.total,
        stats.success,
        stats.error,
        format_bytes(stats.bytes)
    );
}
