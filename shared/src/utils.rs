// Brazilian numeral conventions and text collation shared by loader and formatter.

pub mod brazilian_format {
    use std::num::ParseFloatError;
    use std::str::FromStr;

    // Holds the decimal comma while thousands dots are removed.
    const PLACEHOLDER: char = '\u{1F}';

    /// Rewrites "1.234,56" as "1234.56". The decimal comma is parked on a
    /// placeholder first so a thousands dot can never become the decimal point.
    pub fn to_plain_decimal(s: &str) -> String {
        s.replace(',', &PLACEHOLDER.to_string())
            .replace('.', "")
            .replace(PLACEHOLDER, ".")
    }

    // Parses decimals like "1.234,56" or "123,45" into f64
    pub fn parse_decimal(s: &str) -> Result<f64, ParseFloatError> {
        f64::from_str(&to_plain_decimal(s.trim()))
    }

    /// Formats with a fixed number of decimals, dot grouping and decimal comma.
    /// A value that rounds to zero never carries a minus sign.
    pub fn format_decimal(value: f64, decimals: usize) -> String {
        let formatted = format!("{:.*}", decimals, value.abs());
        let (int_part, frac_part) = match formatted.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (formatted.as_str(), None),
        };

        let rounds_to_zero = formatted.chars().all(|c| c == '0' || c == '.');
        let mut out = String::with_capacity(formatted.len() + formatted.len() / 3 + 1);
        if value.is_sign_negative() && !rounds_to_zero {
            out.push('-');
        }
        out.push_str(&group_thousands(int_part));
        if let Some(frac) = frac_part {
            out.push(',');
            out.push_str(frac);
        }
        out
    }

    fn group_thousands(digits: &str) -> String {
        let len = digits.len();
        let mut out = String::with_capacity(len + len / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push('.');
            }
            out.push(ch);
        }
        out
    }

}

pub mod collation {
    use unicode_normalization::char::is_combining_mark;
    use unicode_normalization::UnicodeNormalization;

    /// Accent- and case-insensitive ordering key: NFKD, drop combining marks, lowercase.
    pub fn sort_key_without_accents(text: &str) -> String {
        text.nfkd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_lowercase()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_sort_key_strips_accents_and_case() {
            assert_eq!(sort_key_without_accents("Água Preta"), "agua preta");
            assert_eq!(sort_key_without_accents("SÃO JOSÉ"), "sao jose");
            assert_eq!(sort_key_without_accents("Ipojuca"), "ipojuca");
        }
    }
}
