//! Choose the extractor for a source document by format and content signature.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{
    BarclaysExtractor, ConsorsbankExtractor, DkbCsvExtractor, Extractor, ExtractorContext,
    Institute, IngExtractor, PayPalCsvExtractor, PayPalPdfExtractor,
};
use crate::error::Result;
use crate::log::RunLog;
use crate::models::Configuration;
use crate::pdf::PdfExtractor;

/// Lines of a CSV export searched for a signature.
const CSV_SIGNATURE_LINES: usize = 10;

/// Statement layout recognized from a document's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    DkbCsv,
    PayPalCsv,
    Ing,
    Barclays,
    Consorsbank,
    PayPalPdf,
}

impl Layout {
    pub fn institute(&self) -> Institute {
        match self {
            Self::DkbCsv => Institute::Dkb,
            Self::PayPalCsv | Self::PayPalPdf => Institute::PayPal,
            Self::Ing => Institute::Ing,
            Self::Barclays => Institute::Barclays,
            Self::Consorsbank => Institute::Consorsbank,
        }
    }

    fn extractor(self, context: ExtractorContext) -> Extractor {
        match self {
            Self::DkbCsv => Extractor::DkbCsv(DkbCsvExtractor::new(context)),
            Self::PayPalCsv => Extractor::PayPalCsv(PayPalCsvExtractor::new(context)),
            Self::Ing => Extractor::Ing(IngExtractor::new(context)),
            Self::Barclays => Extractor::Barclays(BarclaysExtractor::new(context)),
            Self::Consorsbank => Extractor::Consorsbank(ConsorsbankExtractor::new(context)),
            Self::PayPalPdf => Extractor::PayPalPdf(PayPalPdfExtractor::new(context)),
        }
    }
}

/// Recognize a CSV export from its first lines.
///
/// PayPal is checked first, so a DKB export naming PayPal as a partner in its
/// first rows is taken for a PayPal export.
pub fn detect_csv(text: &str) -> Option<Layout> {
    let head: Vec<&str> = text.lines().take(CSV_SIGNATURE_LINES).collect();
    let mentions = |needle: &str| head.iter().any(|line| line.contains(needle));

    if mentions("Transaktionscode") || mentions("PayPal") {
        Some(Layout::PayPalCsv)
    } else if mentions("Buchungsdatum") {
        Some(Layout::DkbCsv)
    } else {
        None
    }
}

/// Recognize a PDF statement from the text of its first page.
///
/// Signatures are checked in a fixed order; the first match wins.
pub fn detect_pdf(first_page: &str) -> Option<Layout> {
    let text = first_page.to_lowercase();
    let has = |needle: &str| text.contains(needle);

    if has("paypal") && (has("händlerkonto-id") || has("transaktionsübersicht")) {
        Some(Layout::PayPalPdf)
    } else if has("ing-diba") || has("ingddeffxxx") {
        Some(Layout::Ing)
    } else if has("consorsbank") || has("kontoauszug") {
        Some(Layout::Consorsbank)
    } else if has("barclaycard") || has("barcdehaxx") {
        Some(Layout::Barclays)
    } else {
        None
    }
}

/// The first [`CSV_SIGNATURE_LINES`] lines of a file, decoded lossily.
fn read_head(path: &Path) -> Result<String> {
    let reader = BufReader::new(File::open(path)?);
    let mut head = String::new();
    for line in reader.split(b'\n').take(CSV_SIGNATURE_LINES) {
        head.push_str(&String::from_utf8_lossy(&line?));
        head.push('\n');
    }
    Ok(head)
}

/// Build the extractor for `path`.
///
/// Returns `Ok(None)` for unsupported formats and unrecognized content. An
/// error means the document could not be read at all.
pub fn create_extractor(
    path: &Path,
    config: &Configuration,
    log: &RunLog,
) -> Result<Option<Extractor>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let layout = match extension.as_str() {
        "csv" => detect_csv(read_head(path)?.trim_start_matches('\u{feff}')),
        "pdf" => detect_pdf(&PdfExtractor::open(path)?.first_page_text()?),
        _ => {
            log.info(format_args!("{}: unsupported file type", path.display()));
            return Ok(None);
        }
    };

    let Some(layout) = layout else {
        log.info(format_args!("{}: no supported statement layout recognized", path.display()));
        return Ok(None);
    };

    let institute = layout.institute();
    let owner = config.owner(institute.name()).cloned();
    let extractor = layout.extractor(ExtractorContext::new(path, owner));
    log.debug(format_args!("{}: using {} extractor", path.display(), extractor.kind()));
    Ok(Some(extractor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InstituteConfig, OwnerConfig};
    use crate::extractor::TransactionExtractor;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_detect_csv() {
        assert_eq!(
            detect_csv("\"Datum\",\"Uhrzeit\",\"Transaktionscode\"\n"),
            Some(Layout::PayPalCsv)
        );
        assert_eq!(
            detect_csv("\"Girokonto\";\"DE12 ...\"\n\n\"Buchungsdatum\";\"Wertstellung\"\n"),
            Some(Layout::DkbCsv)
        );
        assert_eq!(detect_csv("a;b;c\n1;2;3\n"), None);
    }

    #[test]
    fn test_detect_csv_only_reads_the_head() {
        let mut text = "x\n".repeat(CSV_SIGNATURE_LINES);
        text.push_str("Buchungsdatum\n");
        assert_eq!(detect_csv(&text), None);
    }

    #[test]
    fn test_detect_csv_prefers_paypal() {
        let text = "\"Girokonto\";\"DE12 ...\"\n\n\"Buchungsdatum\";\"Wertstellung\"\n\
                    \"03.04.2023\";\"03.04.2023\";\"PayPal Europe S.a.r.l.\"\n";
        assert_eq!(detect_csv(text), Some(Layout::PayPalCsv));
    }

    #[test]
    fn test_read_head() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let mut content = b"Buchungsdatum;Empf\xe4nger\n".to_vec();
        content.extend("row\n".repeat(50).into_bytes());
        std::fs::write(&path, content).unwrap();

        let head = read_head(&path).unwrap();
        assert_eq!(head.lines().count(), CSV_SIGNATURE_LINES);
        assert!(head.starts_with("Buchungsdatum;Empf"));
    }

    #[test]
    fn test_detect_pdf_order() {
        assert_eq!(
            detect_pdf("PayPal Transaktionsübersicht Kontoauszug"),
            Some(Layout::PayPalPdf)
        );
        assert_eq!(detect_pdf("ING-DiBa AG Kontoauszug"), Some(Layout::Ing));
        assert_eq!(detect_pdf("Consorsbank Kontoauszug"), Some(Layout::Consorsbank));
        assert_eq!(detect_pdf("Barclaycard Visa BIC BARCDEHAXXX"), Some(Layout::Barclays));
        // PayPal mentioned without an overview marker
        assert_eq!(detect_pdf("Zahlung via PayPal"), None);
    }

    #[test]
    fn test_create_extractor_for_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.CSV");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "\u{feff}\"Datum\",\"Name\",\"Transaktionscode\"").unwrap();

        let mut config = Configuration::default();
        config.institutes.insert(
            "paypal".to_string(),
            InstituteConfig {
                owner: Some(OwnerConfig {
                    id: Some("max@example.com".to_string()),
                    name: None,
                }),
                validate: Vec::new(),
            },
        );

        let extractor = create_extractor(&path, &config, &RunLog::new())
            .unwrap()
            .unwrap();
        assert_eq!(extractor.institute(), Institute::PayPal);
        assert_eq!(extractor.path(), path.as_path());
        let Extractor::PayPalCsv(paypal) = extractor else {
            panic!("expected PayPal CSV extractor");
        };
        assert_eq!(paypal.context.owner.and_then(|o| o.id).as_deref(), Some("max@example.com"));
    }

    #[test]
    fn test_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new();

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "Buchungsdatum").unwrap();
        assert!(create_extractor(&text, &Configuration::default(), &log).unwrap().is_none());

        let csv = dir.path().join("other.csv");
        std::fs::write(&csv, "a,b\n1,2\n").unwrap();
        assert!(create_extractor(&csv, &Configuration::default(), &log).unwrap().is_none());
        assert_eq!(log.warning_count(), 0);
    }

    #[test]
    fn test_unreadable_pdf_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        assert!(create_extractor(&path, &Configuration::default(), &RunLog::new()).is_err());
    }
}
