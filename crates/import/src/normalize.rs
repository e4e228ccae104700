use caterm_core::{Bank, NormalizationError, Transaction, TransactionCandidate};

// ISO 3166-1 alpha-2 country codes, positions 5-6 of a BIC.
macro_rules! countries {
    () => {
        "AD|AE|AF|AG|AI|AL|AM|AO|AQ|AR|AS|AT|AU|AW|AX|AZ|BA|BB|BD|BE|BF|BG|BH|BI|BJ|BL|BM|BN|\
         BO|BQ|BR|BS|BT|BV|BW|BY|BZ|CA|CC|CD|CF|CG|CH|CI|CK|CL|CM|CN|CO|CR|CU|CV|CW|CX|CY|CZ|\
         DE|DJ|DK|DM|DO|DZ|EC|EE|EG|EH|ER|ES|ET|FI|FJ|FK|FM|FO|FR|GA|GB|GD|GE|GF|GG|GH|GI|GL|\
         GM|GN|GP|GQ|GR|GS|GT|GU|GW|GY|HK|HM|HN|HR|HT|HU|ID|IE|IL|IM|IN|IO|IQ|IR|IS|IT|JE|JM|\
         JO|JP|KE|KG|KH|KI|KM|KN|KP|KR|KW|KY|KZ|LA|LB|LC|LI|LK|LR|LS|LT|LU|LV|LY|MA|MC|MD|ME|\
         MF|MG|MH|MK|ML|MM|MN|MO|MP|MQ|MR|MS|MT|MU|MV|MW|MX|MY|MZ|NA|NC|NE|NF|NG|NI|NL|NO|NP|\
         NR|NU|NZ|OM|PA|PE|PF|PG|PH|PK|PL|PM|PN|PR|PS|PT|PW|PY|QA|RE|RO|RS|RU|RW|SA|SB|SC|SD|\
         SE|SG|SH|SI|SJ|SK|SL|SM|SN|SO|SR|SS|ST|SV|SX|SY|SZ|TC|TD|TF|TG|TH|TJ|TK|TL|TM|TN|TO|\
         TR|TT|TV|TW|TZ|UA|UG|UM|US|UY|UZ|VA|VC|VE|VG|VI|VN|VU|WF|WS|YE|YT|ZA|ZM|ZW"
    };
}

re!(re_iban, r"(?:/?\bIBAN\b[:/]?\s*)?\b[A-Z]{2}\d{2}[A-Z0-9]{4}\d{7,30}\b");
re!(re_bic_labelled, concat!(
    r"/?\bBIC\b[:/]?\s*[A-Z]{4}(?:", countries!(), r")[A-Z0-9]{2}(?:[A-Z0-9]{3})?\b"
));
re!(re_bic, concat!(
    r"\b[A-Z]{4}(?:", countries!(), r")[A-Z0-9]{2}(?:[A-Z0-9]{3})?\b"
));
// In all-caps text ordinary words (`PROVIDER`) take the same shape, so there an
// unlabelled code needs a digit in its location part.
re!(re_bic_with_digit, concat!(
    r"\b[A-Z]{4}(?:", countries!(), r")(?:\d[A-Z0-9]|[A-Z]\d)(?:[A-Z0-9]{3})?\b"
));
re!(re_card_code, r"(?i)PAS\d+\s*NR:\S+");
re!(re_sepa_tag, r"/[A-Z]{3,6}/");
re!(re_reference, r"\b\d{6,}\b");
re!(re_apple_pay, r"(?i)\bBEA,?\s*Apple Pay\b[ ,:]*");
re!(re_ideal, r"(?i)\biDEAL/\s*BI\s*C\b/?[ ,:]*");
re!(re_stamp, r"\d{2}\.\d{2}\.\d{2}/\d{2}:\d{2}");
re!(re_terminal_stamp, r"(?i)a\d{3,4}-*\s*-*\d{2}-\d{2}-\d{4}\s*\d{2}:\d{2}");
re!(re_whitespace, r"\s+");

/// Strip account identifiers and payment boilerplate from a raw description, then
/// collapse whitespace and trim stray commas.
pub fn clean_description(description: &str) -> String {
    let bic = if description.chars().any(char::is_lowercase) {
        re_bic()
    } else {
        re_bic_with_digit()
    };

    let mut s = description.to_string();
    for re in [
        re_iban(),
        re_bic_labelled(),
        bic,
        re_card_code(),
        re_sepa_tag(),
        re_reference(),
        re_apple_pay(),
        re_ideal(),
        re_stamp(),
        re_terminal_stamp(),
    ] {
        s = re.replace_all(&s, " ").into_owned();
    }

    let s = re_whitespace().replace_all(&s, " ");
    let mut s = s.into_owned();
    while s.contains(",,") {
        s = s.replace(",,", ",");
    }
    s.trim_matches([' ', ',']).to_string()
}

/// Turn a finalized candidate into a [`Transaction`]. Pure: the description is cleaned
/// before the hash is computed.
pub fn normalize(
    candidate: TransactionCandidate,
    bank: Bank,
) -> Result<Transaction, NormalizationError> {
    let description = clean_description(&candidate.description);
    Transaction::from_candidate(
        TransactionCandidate {
            description,
            ..candidate
        },
        bank,
    )
}
