//! Download filename selection.

use chrono::NaiveDate;

use coursewright_types::export::ExportFormat;

/// Name used when the service gives no filename hint:
/// `course_design_{session_id}_{YYYY-MM-DD}.{ext}`.
pub fn fallback_filename(session_id: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "course_design_{session_id}_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// The service's hint when present and non-empty, otherwise the fallback.
pub fn download_filename(
    hint: Option<&str>,
    session_id: &str,
    format: ExportFormat,
    date: NaiveDate,
) -> String {
    match hint {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fallback_filename(session_id, format, date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn fallback_pattern() {
        assert_eq!(
            fallback_filename("abc", ExportFormat::Pdf, date()),
            "course_design_abc_2024-03-07.pdf"
        );
        assert_eq!(
            fallback_filename("s-1", ExportFormat::Csv, date()),
            "course_design_s-1_2024-03-07.csv"
        );
    }

    #[test]
    fn hint_wins_over_fallback() {
        assert_eq!(
            download_filename(Some("design.pdf"), "abc", ExportFormat::Pdf, date()),
            "design.pdf"
        );
    }

    #[test]
    fn empty_hint_falls_back() {
        assert_eq!(
            download_filename(Some(""), "abc", ExportFormat::Csv, date()),
            "course_design_abc_2024-03-07.csv"
        );
        assert_eq!(
            download_filename(None, "abc", ExportFormat::Csv, date()),
            "course_design_abc_2024-03-07.csv"
        );
    }
}
