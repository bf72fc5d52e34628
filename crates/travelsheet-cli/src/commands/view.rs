//! Read-only commands: print derived views of the loaded snapshot.

use super::boot::App;
use anyhow::Result;
use travelsheet_core::checklist::{collapsed_text, parse_content_lines};
use travelsheet_core::view::{
    category_color_map, format_display_date, format_display_time, format_thousands,
    weekday_label,
};

pub async fn itinerary(app: &App, date: Option<&str>) -> Result<()> {
    let rows = app.coordinator.itinerary_view(date).await;
    if rows.is_empty() {
        println!("📭 No itinerary entries");
        return Ok(());
    }

    let colors = category_color_map(&app.coordinator.snapshot().await.itinerary);
    let mut current_day: Option<&str> = None;
    for row in &rows {
        let entry = &row.entry;
        if current_day != Some(entry.day.as_str()) {
            println!(
                "\n📅 {} {}",
                format_display_date(&entry.day),
                weekday_label(&entry.day)
            );
            current_day = Some(entry.day.as_str());
        }

        let time = if row.is_extra_day {
            "  ↳  ".to_string()
        } else {
            format_display_time(&entry.time)
        };
        print!(
            "  {}  [{}|{}] {}",
            time,
            entry.category,
            colors.class_for(&entry.category),
            entry.content
        );
        if !entry.location.is_empty() {
            print!(" @ {}", entry.location);
        }
        println!();
    }
    Ok(())
}

pub async fn dates(app: &App) -> Result<()> {
    for day in app.coordinator.available_dates().await {
        println!("{} {}", day, weekday_label(&day));
    }
    Ok(())
}

pub async fn expenses(app: &App, payer: &str, debtor: &str) -> Result<()> {
    let ledger = app.coordinator.expense_view(payer, debtor).await;
    for record in &ledger.rows {
        println!(
            "{}  {:<20} {:>10} {:<4} NT$ {:>8}  {} → {}",
            record.date,
            record.item,
            record.amount,
            record.currency,
            format_thousands(record.twd),
            record.payer,
            record.debtor
        );
    }
    println!("\n💰 Total: {}", ledger.formatted_total);
    Ok(())
}

pub async fn wishes(app: &App, tags: &[String], query: &str) -> Result<()> {
    let results = app.coordinator.wish_view(tags, query).await;
    if results.is_empty() {
        println!("📭 No matching wishes");
        return Ok(());
    }

    for wish in &results {
        let mark = if wish.is_done { "✔" } else { "•" };
        let id = wish.id.as_deref().unwrap_or("?");
        if !wish.has_checklist() {
            println!("{} [{}] {} {}", mark, id, wish.tag, collapsed_text(&wish.content));
            continue;
        }

        println!("{} [{}] {}", mark, id, wish.tag);
        for line in parse_content_lines(&wish.content) {
            if line.is_checklist {
                let box_mark = if line.done { "[x]" } else { "[ ]" };
                println!("    {:>2}: {} {}", line.index, box_mark, line.text);
            } else if !line.text.trim().is_empty() {
                println!("        {}", line.text);
            }
        }
    }
    Ok(())
}
