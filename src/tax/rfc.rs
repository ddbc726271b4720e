use serde::{Deserialize, Serialize};

/// kind of taxpayer an RFC identifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxpayerKind {
    /// persona moral: 3-letter prefix, 12 characters
    Company,
    /// persona física: 4-letter prefix, 13 characters
    Individual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfcValidation {
    pub is_valid: bool,
    pub kind: Option<TaxpayerKind>,
    pub message: Option<String>,
}

/// check the shape of an RFC: name prefix, 6-digit date, 3-character homoclave.
/// input is trimmed and upper-cased first; only the format is checked
pub fn validate_rfc(rfc: &str) -> RfcValidation {
    let normalized = normalize(rfc);
    let chars: Vec<char> = normalized.chars().collect();

    let kind = match chars.len() {
        12 if matches_layout(&chars, 3) => Some(TaxpayerKind::Company),
        13 if matches_layout(&chars, 4) => Some(TaxpayerKind::Individual),
        _ => None,
    };

    RfcValidation {
        is_valid: kind.is_some(),
        kind,
        message: kind.is_none().then(|| {
            "RFC format is not valid: individuals use 13 characters, companies 12".to_string()
        }),
    }
}

/// legal text printed on fiscal receipts issued by a lender
pub fn fiscal_legend(issuer_rfc: &str, issuer_name: &str) -> String {
    format!(
        "This document is a transaction receipt issued by {} (RFC: {}). \
         Interest and fees are subject to IVA under articles 1 and 14 of the Value Added Tax Law. \
         Consult your tax advisor regarding deductibility.",
        issuer_name.trim(),
        normalize(issuer_rfc)
    )
}

fn normalize(rfc: &str) -> String {
    rfc.trim().to_uppercase()
}

fn matches_layout(chars: &[char], prefix: usize) -> bool {
    let (name, rest) = chars.split_at(prefix);
    let (date, homoclave) = rest.split_at(6);

    name.iter().all(|c| c.is_ascii_uppercase() || matches!(c, 'Ñ' | '&'))
        && date.iter().all(char::is_ascii_digit)
        && homoclave.iter().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_rfc() {
        let check = validate_rfc("ABC010203XY9");
        assert!(check.is_valid);
        assert_eq!(check.kind, Some(TaxpayerKind::Company));
        assert!(check.message.is_none());
    }

    #[test]
    fn test_individual_rfc() {
        let check = validate_rfc("GOMA850101AB1");
        assert!(check.is_valid);
        assert_eq!(check.kind, Some(TaxpayerKind::Individual));
    }

    #[test]
    fn test_enye_and_ampersand_in_prefix() {
        assert_eq!(validate_rfc("ÑUÑE900315H2A").kind, Some(TaxpayerKind::Individual));
        assert_eq!(validate_rfc("A&B991231K10").kind, Some(TaxpayerKind::Company));
    }

    #[test]
    fn test_malformed_rfc() {
        for rfc in ["", "ABC0102XY9", "ABC01020AXY9", "GOMA850101AB-", "1BCD850101AB1", "GOMA850101AB12"] {
            let check = validate_rfc(rfc);
            assert!(!check.is_valid, "{rfc} should be rejected");
            assert!(check.kind.is_none());
            assert!(check.message.unwrap().contains("13 characters"));
        }
    }

    #[test]
    fn test_lowercase_with_whitespace() {
        let check = validate_rfc("  goma850101ab1 \n");
        assert_eq!(check.kind, Some(TaxpayerKind::Individual));
        assert_eq!(validate_rfc(" ñuñe900315h2a").kind, Some(TaxpayerKind::Individual));
    }

    #[test]
    fn test_fiscal_legend() {
        let legend = fiscal_legend(" abc010203xy9 ", "Financiera del Norte SA de CV");
        assert!(legend.contains("issued by Financiera del Norte SA de CV (RFC: ABC010203XY9)"));
        assert!(legend.contains("articles 1 and 14"));
    }
}
