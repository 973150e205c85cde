use std::fmt::Write;

use crate::summary::{CardCategory, CardSet, SummaryRecord, AD_TECH_GROUP_TITLE};

/// Format styles supported in default reporter implementations.
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Fallback block titles used when the classifier omitted a category card.
/// An absent card always renders as an unchecked block, never as an error.
const FALLBACK_AD_TRACKERS_TITLE: &str = "Ad trackers";
const FALLBACK_COOKIES_TITLE: &str = "Third-party cookies";
const FALLBACK_KEY_LOGGING_TITLE: &str = "Keystroke logging";
const FALLBACK_PIXEL_TITLE: &str = "Facebook pixel";
const FALLBACK_REMARKETING_TITLE: &str = "Google Analytics remarketing audiences";

const SEPARATOR: &str = "-----------------------------------------------";

/// Produce a per-site findings report using the desired format.
///
/// The narrative is display-only and derives purely from the summary record
/// plus the original card titles; no classification work happens here.
pub fn render_report(
    record: &SummaryRecord,
    cards: &CardSet,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(record, cards),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
    }
}

fn render_human(record: &SummaryRecord, cards: &CardSet) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "{SEPARATOR}")?;
    writeln!(out, "Scanned {}, {} page(s):", record.host, record.pages_number)?;
    writeln!(out, "{}", record.url)?;
    if !record.additional_urls.is_empty() {
        for url in record.additional_urls.split("; ") {
            writeln!(out, "{url}")?;
        }
    }

    // Ad trackers
    writeln!(out)?;
    writeln!(
        out,
        "{}{}{}",
        count_prefix(record.ad_trackers_number),
        card_title(cards, CardCategory::AdTrackers, FALLBACK_AD_TRACKERS_TITLE),
        statement_suffix(&record.ad_trackers_statement),
    )?;
    if !record.ad_trackers_owners.is_empty() {
        writeln!(
            out,
            "Scripts detected belonging to: {}",
            record.ad_trackers_owners
        )?;
    }

    // Third-party cookies
    writeln!(out)?;
    writeln!(
        out,
        "{}{}{}",
        count_prefix(record.cookies_number),
        card_title(cards, CardCategory::Cookies, FALLBACK_COOKIES_TITLE),
        statement_suffix(&record.cookies_statement),
    )?;
    if !record.cookies_owners.is_empty() {
        writeln!(out, "Cookies detected set for: {}", record.cookies_owners)?;
    }

    // Canvas fingerprinting
    writeln!(out)?;
    if record.canvas_fingerprinting_found == "true" {
        writeln!(out, "[X] Canvas fingerprinting was detected on this website.")?;
        if !record.canvas_fingerprinting_owners.is_empty() {
            writeln!(
                out,
                "Scripts detected belonging to: {}",
                record.canvas_fingerprinting_owners
            )?;
        }
    } else {
        writeln!(out, "[ ] Canvas fingerprinting was not detected on this website.")?;
    }

    // Session recording
    writeln!(out)?;
    if record.session_recording_found == "true" {
        writeln!(out, "[X] The use of a session recorder was detected.")?;
        if !record.session_recording_owners.is_empty() {
            writeln!(
                out,
                "Scripts detected belonging to: {}",
                record.session_recording_owners
            )?;
        }
    } else {
        writeln!(out, "[ ] No use of a session recorder was detected.")?;
    }

    // Key logging
    writeln!(out)?;
    writeln!(
        out,
        "{}{}",
        checkbox(&record.key_logging_found),
        card_title(cards, CardCategory::KeyLogging, FALLBACK_KEY_LOGGING_TITLE),
    )?;
    if record.key_logging_found == "true" && !record.key_logging_owners.is_empty() {
        writeln!(
            out,
            "Scripts detected belonging to: {}",
            record.key_logging_owners
        )?;
    }

    // Meta pixel
    writeln!(out)?;
    writeln!(
        out,
        "{}{}",
        checkbox(&record.pixel_found),
        card_title(cards, CardCategory::Pixel, FALLBACK_PIXEL_TITLE),
    )?;

    // Google Analytics remarketing
    writeln!(out)?;
    writeln!(
        out,
        "{}{}",
        checkbox(&record.google_remarketing_found),
        card_title(cards, CardCategory::Remarketing, FALLBACK_REMARKETING_TITLE),
    )?;

    // Ad-tech companies this site interacted with
    if !record.ad_tech_companies.is_empty() {
        let title = cards
            .group(AD_TECH_GROUP_TITLE)
            .map(|group| group.title.as_str())
            .unwrap_or(AD_TECH_GROUP_TITLE);
        writeln!(out)?;
        writeln!(out, "{title}")?;
        writeln!(out, "{}", record.ad_tech_companies)?;
    }

    Ok(out)
}

fn card_title<'a>(cards: &'a CardSet, category: CardCategory, fallback: &'a str) -> &'a str {
    cards
        .card(category)
        .map(|card| card.title.as_str())
        .unwrap_or(fallback)
}

fn count_prefix(count: u64) -> String {
    if count > 0 {
        format!("[X] {count} ")
    } else {
        "[ ] ".to_string()
    }
}

fn checkbox(found: &str) -> &'static str {
    if found == "true" {
        "[X] "
    } else {
        "[ ] "
    }
}

fn statement_suffix(statement: &str) -> String {
    if statement.is_empty() {
        String::new()
    } else {
        format!(" - {statement}")
    }
}
