//! Line patterns of the supported statement layouts.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ING: 02.01.2023 Lastschrift Stadtwerke -85,00 [rest]
    pub static ref ING_BOOKING_LINE: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})\s+(.+?)\s+(-?\d{1,3}(?:\.\d{3})*(?:,\d{2}))\s*(.*)?$"
    ).unwrap();

    // ING: valuta date directly below the booking line
    pub static ref ING_VALUTA_LINE: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})(?:\s+(.*))?$"
    ).unwrap();

    // ING: booking kind inside the booking text
    pub static ref ING_KIND: Regex = Regex::new(
        r"(?i)\b(Lastschrift|Gutschrift)\b"
    ).unwrap();

    // Card marker; text after it names the merchant
    pub static ref VISA_TOKEN: Regex = Regex::new(
        r"(?i)\bVISA\b"
    ).unwrap();

    // ING: ARN74987503004GooglePay -> reference id + payment institute
    pub static ref ING_REFERENCE: Regex = Regex::new(
        r"^(ARN|1024|NR)(\d+)([A-Za-z].*)?$"
    ).unwrap();

    pub static ref ING_MANDATE: Regex = Regex::new(
        r"^Mandat:\s*(\S+)"
    ).unwrap();

    pub static ref ING_CUSTOMER_REFERENCE: Regex = Regex::new(
        r"^Referenz:\s*(\S+)"
    ).unwrap();

    pub static ref ING_TERMINATOR: Regex = Regex::new(
        r"^(?:Neuer|Alter) Saldo\b"
    ).unwrap();

    // Barclays: 02.01.2023 03.01.2023 AMAZON EU [DE Visa] 19,99-
    pub static ref BARCLAYS_BOOKING_LINE: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})\s+(\d{2}\.\d{2}\.\d{4})\s+(.+?)\s+(?:(PT|DE|LU)\s+Visa\s+)?\s*(-?\d{1,3}(?:\.\d{3})*(?:,\d{2})[-+]?)$"
    ).unwrap();

    pub static ref BARCLAYS_MANDATE: Regex = Regex::new(
        r"^P\d+$"
    ).unwrap();

    pub static ref BARCLAYS_CREDITOR_ID: Regex = Regex::new(
        r"^DE\d{2}[A-Z0-9]+$"
    ).unwrap();

    pub static ref BARCLAYS_TERMINATOR: Regex = Regex::new(
        r"^(?:Neuer Saldo|Saldo)\b"
    ).unwrap();

    // Consorsbank: block headers opening a booking
    pub static ref CONSORS_BLOCK_START: Regex = Regex::new(
        r"^(LASTSCHRIFT|EURO-UEBERW\.|GUTSCHRIFT|GEBUEHREN|DAUERAUFTRAG)(?:\s|$)"
    ).unwrap();

    // Consorsbank: 01.11. 2345 01.11. 1.020,30-
    // Column header repeated on every page above the bookings
    pub static ref CONSORS_COLUMN_HEADER: Regex = Regex::new(
        r"^Text/Verwendungszweck\b"
    ).unwrap();

    pub static ref CONSORS_BOOKING_LINE: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.)\s+\d+\s+(\d{2}\.\d{2}\.)\s+([\d.,]+[-+])$"
    ).unwrap();

    // Consorsbank: first part of a split booking line, 03.11. 8420 [03.11.]
    pub static ref CONSORS_DATE_AND_NUMBER: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.)\s+\d+(?:\s+(\d{2}\.\d{2}\.))?$"
    ).unwrap();

    pub static ref CONSORS_YEARLESS_DATE: Regex = Regex::new(
        r"^\d{2}\.\d{2}\.$"
    ).unwrap();

    pub static ref CONSORS_SIGNED_AMOUNT: Regex = Regex::new(
        r"^[\d.,]+[-+]$"
    ).unwrap();

    // Consorsbank: *** Kontostand zum 31.10.2022 1.000,00+
    pub static ref CONSORS_BALANCE: Regex = Regex::new(
        r"\*\*\*\s*Kontostand zum\D*(?:\d{2}\.\d{2}\.(?:\d{4}|\d{2})?\s+)?([\d.,]+[+-])"
    ).unwrap();

    pub static ref CONSORS_CURRENCY: Regex = Regex::new(
        r"Kontowährung\s+([A-Z]{3})"
    ).unwrap();

    pub static ref CONSORS_HOLDER: Regex = Regex::new(
        r"Kontoinhaber\s+(\S.*)"
    ).unwrap();

    // PayPal PDF: 03.07.2023 <description> <code> ... <amount>
    pub static ref PAYPAL_PDF_ROW: Regex = Regex::new(
        r"^\d{2}\.\d{2}\.\d{4}\s"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ing_booking_line() {
        let caps = ING_BOOKING_LINE
            .captures("02.01.2023 Lastschrift Stadtwerke Musterstadt -1.085,00")
            .unwrap();
        assert_eq!(&caps[1], "02.01.2023");
        assert_eq!(&caps[2], "Lastschrift Stadtwerke Musterstadt");
        assert_eq!(&caps[3], "-1.085,00");
        assert!(!ING_BOOKING_LINE.is_match("02.01.2023 Abschlag Januar"));
    }

    #[test]
    fn test_barclays_booking_line() {
        let caps = BARCLAYS_BOOKING_LINE
            .captures("02.01.2023 03.01.2023 AMAZON EU SARL DE Visa 19,99-")
            .unwrap();
        assert_eq!(&caps[3], "AMAZON EU SARL");
        assert_eq!(caps.get(4).map(|m| m.as_str()), Some("DE"));
        assert_eq!(&caps[5], "19,99-");
    }

    #[test]
    fn test_consors_balance() {
        let caps = CONSORS_BALANCE
            .captures("*** Kontostand zum 31.10.2022 1.234,56+")
            .unwrap();
        assert_eq!(&caps[1], "1.234,56+");

        let caps = CONSORS_BALANCE.captures("*** Kontostand zum 10.000,00-").unwrap();
        assert_eq!(&caps[1], "10.000,00-");
    }
}
