//! Mutating commands. Wish edits are batched and flushed on exit.

use super::boot::App;
use anyhow::Result;
use std::path::PathBuf;
use travelsheet_application::UploadReport;
use travelsheet_core::model::SheetKind;

pub async fn toggle_wishes(app: &App, ids: &[String]) -> Result<()> {
    for id in ids {
        app.coordinator.toggle_wish_done(id).await?;
    }
    println!("📝 {} wish(es) queued", ids.len());
    Ok(())
}

pub async fn check(app: &App, wish_id: &str, line: usize) -> Result<()> {
    app.coordinator.toggle_checklist_item(wish_id, line).await?;
    println!("📝 Line {} of wish {} queued", line, wish_id);
    Ok(())
}

pub async fn delete(app: &App, sheet: SheetKind, id: &str, confirmed: bool) -> Result<()> {
    if !confirmed {
        println!("⚠️  Not deleted. Re-run with --yes to delete {} '{}'", sheet, id);
    }
    app.coordinator.remove(sheet, id, confirmed).await?;
    Ok(())
}

pub async fn upload(app: &App, files: &[PathBuf]) -> Result<()> {
    let report = run_upload(app, files).await;
    for url in &report.urls {
        println!("{}", url);
    }
    check_report(&report, files.len())
}

/// Uploads images for a form. URLs come back only when every file made it.
pub async fn upload_images(app: &App, files: &[PathBuf]) -> Result<Vec<String>> {
    if files.is_empty() {
        return Ok(Vec::new());
    }
    let report = run_upload(app, files).await;
    check_report(&report, files.len())?;
    Ok(report.urls)
}

async fn run_upload(app: &App, files: &[PathBuf]) -> UploadReport {
    let mut progress = app.uploader.subscribe();
    let watcher = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let p = *progress.borrow_and_update();
            if p.total > 0 {
                eprintln!("⏫ {}/{}", p.current, p.total);
            }
        }
    });

    let report = app.uploader.upload_files(files).await;
    watcher.abort();
    report
}

fn check_report(report: &UploadReport, total: usize) -> Result<()> {
    if report.skipped > 0 {
        eprintln!("⏭️  {} file(s) skipped", report.skipped);
    }
    anyhow::ensure!(
        report.failures.is_empty() && report.skipped == 0,
        "{} of {} upload(s) failed",
        report.failures.len() + report.skipped,
        total
    );
    Ok(())
}
