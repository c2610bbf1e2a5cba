//! Document list commands.

use anyhow::Result;
use colored::Colorize;
use focuslock_application::SessionController;
use focuslock_core::document::DocumentSummary;

pub async fn list(controller: &SessionController) -> Result<()> {
    let index = controller.document_index().await;
    if index.is_empty() {
        println!("{}", "No documents yet. Create one with `focuslock new <TITLE>`.".dimmed());
        return Ok(());
    }
    for summary in &index {
        println!("{}", format_summary(summary));
    }
    Ok(())
}

pub async fn create(controller: &SessionController, title: &str) -> Result<()> {
    let document = controller.new_document(title).await?;
    println!("{} {}", "Created".green(), document.id);
    Ok(())
}

pub async fn delete(controller: &SessionController, id: &str) -> Result<()> {
    controller.delete_document(id).await?;
    println!("{} {}", "Deleted".yellow(), id);
    Ok(())
}

fn format_summary(summary: &DocumentSummary) -> String {
    format!(
        "{}  {}  {}",
        summary.id.dimmed(),
        summary.modified_at.format("%Y-%m-%d %H:%M"),
        summary.title.bold()
    )
}
