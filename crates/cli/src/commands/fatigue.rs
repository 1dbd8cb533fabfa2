//! Fatigue snapshot commands.

use std::path::Path;

use shiftwatch_client::SnapshotUpload;
use shiftwatch_client::projection::{FATIGUE_PAGE_SIZE, paginate};
use shiftwatch_core::FatigueEventId;

use super::{CommandError, Context, parse_id};

/// MIME type for an image path, by extension.
fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// List snapshots, five per page.
pub async fn list(ctx: &Context, page: usize) -> Result<(), CommandError> {
    let events = ctx.client.list_fatigue().await?;
    let shown = paginate(&events, page, FATIGUE_PAGE_SIZE);
    let tz = ctx.config.display_offset;

    #[allow(clippy::print_stdout)]
    {
        if shown.items.is_empty() {
            println!("Sin eventos de fatiga");
        }
        for event in shown.items {
            println!(
                "{:>5}  {}  {:<12} {:<20} {}",
                event.id,
                event.recorded_at.with_timezone(&tz).format("%d/%m/%Y %H:%M"),
                event.camera_id,
                event.environment,
                event.photo_url,
            );
        }
        println!("Página {} de {}", shown.page, shown.total_pages.max(1));
    }
    Ok(())
}

/// Upload a snapshot image.
pub async fn upload(
    ctx: &Context,
    camera: &str,
    environment: &str,
    file: &Path,
) -> Result<(), CommandError> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|source| CommandError::File {
            path: file.display().to_string(),
            source,
        })?;

    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("foto")
        .to_owned();

    let event = ctx
        .client
        .upload_fatigue(SnapshotUpload {
            camera_id: camera.to_owned(),
            environment: environment.to_owned(),
            file_name,
            content_type: content_type(file).to_owned(),
            bytes,
        })
        .await?;

    #[allow(clippy::print_stdout)]
    {
        println!("Evento {} registrado: {}", event.id, event.photo_url);
    }
    Ok(())
}

/// Delete a snapshot.
pub async fn delete(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let id: FatigueEventId = parse_id(id)?;
    let message = ctx.client.delete_fatigue(id).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{message}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type(Path::new("a/b/cara.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("cara.jpeg")), "image/jpeg");
        assert_eq!(content_type(Path::new("cara.png")), "image/png");
        assert_eq!(content_type(Path::new("cara.gif")), "application/octet-stream");
        assert_eq!(content_type(Path::new("cara")), "application/octet-stream");
    }
}
