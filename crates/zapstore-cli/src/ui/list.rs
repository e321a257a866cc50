//! List and search output formatting
//!
//! Provides column-aligned rendering for `zapstore list` and `zapstore search`.

use std::io::{self, Write};

use crossterm::style::Stylize;
use zapstore_core::InstalledPackage;
use zapstore_schema::AppDescriptor;

use super::theme::Theme;

/// Render the installed-package table. Rows come out in the order given.
pub fn write_list<'a, W: Write>(
    out: &mut W,
    packages: impl IntoIterator<Item = (&'a String, &'a InstalledPackage)>,
) -> io::Result<()> {
    let theme = Theme::default();
    let cols = &theme.layout;

    let header = format!(
        "  {:<nw$} {:<vw$} {:<ew$} {}",
        "PACKAGE",
        "VERSION",
        "EXECUTABLES",
        "INSTALLED",
        nw = cols.name_width,
        vw = cols.version_width,
        ew = cols.executables_width,
    );
    writeln!(out)?;
    writeln!(out, "{}", header.dark_grey())?;

    let mut count = 0usize;
    for (app_id, pkg) in packages {
        let name = format!("{app_id:<width$}", width = cols.name_width);
        let version = format!("{:<width$}", pkg.version, width = cols.version_width);
        let exes = format!(
            "{:<width$}",
            pkg.executables.join(", "),
            width = cols.executables_width
        );
        writeln!(
            out,
            "  {} {} {} {}",
            name.with(theme.colors.package_name),
            version.with(theme.colors.version),
            exes,
            install_date(&pkg.installed_at).with(theme.colors.secondary),
        )?;
        count += 1;
    }

    writeln!(out)?;
    let footer = format!(
        "  {count} package{}",
        if count == 1 { "" } else { "s" }
    );
    writeln!(out, "{}", footer.dark_grey())
}

/// Render search hits: id, display name and summary.
pub fn write_search<W: Write>(out: &mut W, apps: &[AppDescriptor]) -> io::Result<()> {
    let theme = Theme::default();
    let width = theme.layout.name_width;

    writeln!(out)?;
    for app in apps {
        let id = format!("{:<width$}", app.id);
        let name = if app.name == app.id {
            String::new()
        } else {
            format!("{} ", app.name)
        };
        writeln!(
            out,
            "  {} {}{}",
            id.with(theme.colors.package_name),
            name.bold(),
            app.summary.as_str().with(theme.colors.secondary),
        )?;
    }
    Ok(())
}

/// `YYYY-MM-DD` for an RFC 3339 timestamp; anything else is shown as-is.
fn install_date(installed_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(installed_at).map_or_else(
        |_| installed_at.to_string(),
        |dt| dt.format("%Y-%m-%d").to_string(),
    )
}
