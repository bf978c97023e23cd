//! FILENAME: app/cli/src/messages.rs
//! PURPOSE: User-facing messages in Greek and English.

use injector::{InjectError, Locale, MergeReport, SummaryReport};
use std::path::Path;

/// Flag, then config, then the system locale, then English.
pub fn resolve_locale(flag: Option<Locale>, config: Option<Locale>) -> Locale {
    pick_locale(flag, config, sys_locale::get_locale())
}

fn pick_locale(flag: Option<Locale>, config: Option<Locale>, system: Option<String>) -> Locale {
    flag.or(config)
        .or_else(|| system.as_deref().and_then(Locale::from_tag))
        .unwrap_or(Locale::En)
}

pub fn success(locale: Locale, output: &Path, report: &MergeReport) -> String {
    let monthly = report.monthly.as_ref().map_or(0, |r| r.injected.len());
    let summary = match &report.summary {
        SummaryReport::Adapted(r) => r.written.len(),
        SummaryReport::Injected(r) => r.injected.len(),
    };
    match locale {
        Locale::El => format!(
            "Έτοιμο! Το αρχείο {} περιέχει {} μηνιαία φύλλα και {} φύλλα σύνοψης.",
            output.display(),
            monthly,
            summary
        ),
        Locale::En => format!(
            "Done! {} now has {} monthly sheet(s) and {} summary sheet(s).",
            output.display(),
            monthly,
            summary
        ),
    }
}

pub fn preserved(locale: Locale, names: &[String]) -> String {
    match locale {
        Locale::El => format!("Διατηρήθηκαν αμετάβλητα: {}", names.join(", ")),
        Locale::En => format!("Left unchanged: {}", names.join(", ")),
    }
}

pub fn failure(locale: Locale, error: &InjectError) -> String {
    let detail = match (locale, error) {
        (Locale::El, InjectError::MissingSheet(name)) => {
            format!("Το φύλλο '{}' δεν υπάρχει στο πρότυπο.", name)
        }
        (Locale::El, InjectError::MalformedDocument(e)) => {
            format!("Το αρχείο δεν είναι έγκυρο βιβλίο Excel ({}).", e)
        }
        (Locale::El, InjectError::Config(e)) => format!("Μη έγκυρες ρυθμίσεις: {}", e),
        (Locale::El, InjectError::Io(e)) => format!("Σφάλμα αρχείου: {}", e),
        (Locale::El, other) => other.to_string(),
        (Locale::En, other) => other.to_string(),
    };
    match locale {
        Locale::El => format!("Αποτυχία: {}", detail),
        Locale::En => format!("Failed: {}", detail),
    }
}
