//! Handlers for categories and display preferences.

use crate::args::PrefsArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Preferences;
use crate::rows::{OutputFormat, Rows, Table};
use crate::{Config, Result};

/// Lists the categories in their stored order.
pub async fn categories(config: Config) -> Result<Out<Rows>> {
    let categories = config.ledger().await?.categories();
    let mut table = Table::new(["Id", "Name"]);
    for c in categories.iter() {
        table.push([c.id(), c.name()]);
    }
    let rows = table.render(OutputFormat::Table)?;
    let noun = if categories.len() == 1 {
        "category"
    } else {
        "categories"
    };
    Ok(Out::new(format!("{} {noun}", categories.len()), rows))
}

/// Shows the preferences, applying `--toggle-theme` and `--font-size` first if given.
pub async fn prefs(config: Config, args: PrefsArgs) -> Result<Out<Preferences>> {
    let ledger = config.ledger().await?;
    let cell = ledger.store().preferences();
    if args.toggle_theme() || args.font_size().is_some() {
        cell.update(|p| {
            if args.toggle_theme() {
                p.toggle_theme();
            }
            if let Some(size) = args.font_size() {
                p.set_font_size(size);
            }
        })
        .await
        .pub_result(ErrorType::Store)?;
    }
    let prefs = cell.get();
    let message = format!("Theme: {}, font size: {}", prefs.theme(), prefs.font_size());
    Ok(Out::new(message, prefs))
}
