//! Bank identification.

use tracing::debug;

use crate::templates::{BankTemplate, TemplateTable};

/// Selects the template whose identifiers match a statement.
pub struct BankIdentifier<'t> {
    table: &'t TemplateTable,
}

impl<'t> BankIdentifier<'t> {
    pub fn new(table: &'t TemplateTable) -> Self {
        Self { table }
    }

    /// First template in table order with a matching identifier pattern.
    pub fn identify(&self, text: &str) -> Option<&'t BankTemplate> {
        let found = self.table.iter().find(|t| t.is_identified_by(text));

        match found {
            Some(template) => debug!("Identified bank: {}", template.bank_key()),
            None => debug!("No template identifier matched"),
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateSpec;

    #[test]
    fn test_identify_builtin_banks() {
        let identifier = BankIdentifier::new(TemplateTable::builtin());

        let cases = [
            ("Welcome to HDFC Bank", "hdfc"),
            ("ICICI Bank Credit Card Statement", "icici"),
            ("SBI Card Monthly Statement", "sbi"),
            ("Axis Bank Limited", "axis"),
            ("Kotak Mahindra Bank Ltd", "kotak"),
        ];

        for (text, key) in cases {
            assert_eq!(identifier.identify(text).map(|t| t.bank_key()), Some(key), "{}", text);
        }
    }

    #[test]
    fn test_identify_is_case_insensitive() {
        let identifier = BankIdentifier::new(TemplateTable::builtin());
        assert_eq!(
            identifier.identify("statement from hdfc bank ltd").map(|t| t.bank_key()),
            Some("hdfc")
        );
    }

    #[test]
    fn test_first_template_wins() {
        let identifier = BankIdentifier::new(TemplateTable::builtin());
        let text = "Pay your ICICI Bank card bills from your HDFC Bank account";

        assert_eq!(identifier.identify(text).map(|t| t.bank_key()), Some("hdfc"));
    }

    #[test]
    fn test_generic_identifier_after_specific() {
        let table = TemplateTable::from_specs([
            TemplateSpec::new("gold", ["Acme Gold"]).with_identifiers([r"Acme\s+Gold"]),
            TemplateSpec::new("acme", ["Acme"]).with_identifiers(["Acme"]),
        ])
        .unwrap();
        let identifier = BankIdentifier::new(&table);

        assert_eq!(identifier.identify("Acme Gold card").map(|t| t.bank_key()), Some("gold"));
        assert_eq!(identifier.identify("Acme Classic card").map(|t| t.bank_key()), Some("acme"));
    }

    #[test]
    fn test_unknown_bank() {
        let identifier = BankIdentifier::new(TemplateTable::builtin());
        assert!(identifier.identify("Statement from First Imaginary Bank").is_none());
    }
}
