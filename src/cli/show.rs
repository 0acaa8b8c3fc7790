use super::ui;
use crate::core::config::AppConfig;
use crate::core::{DocumentKey, Karat, RateSnapshot, SnapshotStore};
use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use comfy_table::Cell;

impl RateSnapshot {
    pub fn display_as_table(&self, key: &DocumentKey) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Karat"),
            ui::header_cell("Purity"),
            ui::header_cell(&format!("Price ({})", self.unit)),
        ]);

        for karat in Karat::ALL {
            table.add_row(vec![
                Cell::new(karat.to_string()),
                Cell::new(format!("{:.1}%", karat.purity() * 100.0)),
                ui::price_cell(format!("{:.2}", self.rates.get(karat))),
            ]);
        }

        let mut output = format!(
            "Snapshot: {}\n\n",
            ui::style_text(&key.to_string(), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{} {} ({})",
            ui::style_text("Updated:", ui::StyleType::Label),
            ui::style_text(&self.updated_at.to_rfc3339(), ui::StyleType::Value),
            ui::style_text(&self.source, ui::StyleType::Subtle)
        ));
        output
    }
}

/// Prints the stored snapshot, or a note when none has been written yet.
pub async fn show_snapshot(config: &AppConfig, store: &dyn SnapshotStore) -> Result<()> {
    let key = config.document_key();
    match store.get(&key).await? {
        Some(snapshot) => println!("{}", snapshot.display_as_table(&key)),
        None => println!(
            "{}",
            ui::style_text(
                &format!("No snapshot stored for {key} yet"),
                ui::StyleType::Subtle
            )
        ),
    }
    Ok(())
}

pub fn format_triggers(triggers: &[DateTime<Utc>], offset: FixedOffset) -> String {
    triggers
        .iter()
        .map(|t| {
            format!(
                "{}  {}",
                t.with_timezone(&offset).format("%Y-%m-%d %H:%M %:z"),
                ui::style_text(&t.format("(%H:%M UTC)").to_string(), ui::StyleType::Subtle)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
