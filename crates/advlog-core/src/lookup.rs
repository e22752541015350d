//! Vendor, model and identity lookup hooks.
//!
//! Name databases are external collaborators. The decoder only asks
//! questions through [`Lookup`]; a missing answer is a normal outcome and
//! the field is rendered without the annotation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use advlog_types::{AddressType, BdAddr};

/// Display strings for a Device ID modalias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorModel {
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

/// Optional name resolution used while rendering fields.
///
/// Every method defaults to "unknown", so implementors override only what
/// they can answer.
pub trait Lookup {
    /// Company name for a Bluetooth SIG company identifier.
    fn company_name(&self, _company_id: u16) -> Option<String> {
        None
    }

    /// Company name for the OUI of a public address.
    fn oui_company(&self, _address: &BdAddr) -> Option<String> {
        None
    }

    /// Vendor/product names for a `bluetooth:v…p…d…` or `usb:v…p…d…` key.
    fn vendor_model(&self, _modalias: &str) -> Option<VendorModel> {
        None
    }

    /// Identity address behind a resolvable private address.
    fn resolve_identity(&self, _address: &BdAddr) -> Option<(BdAddr, AddressType)> {
        None
    }
}

/// Lookup that never knows anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl Lookup for NoLookup {}

/// Identity mapping for one resolvable private address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityEntry {
    /// Identity address in `AA:BB:CC:DD:EE:FF` form.
    pub address: String,
    /// `true` for a random static identity, `false` for public.
    #[serde(default)]
    pub random: bool,
}

/// Table-driven lookup, typically loaded from a configuration file.
///
/// ```toml
/// [companies]
/// 76 = "Apple, Inc."
///
/// [ouis]
/// "00-1A-7D" = "cyber-blue(HK)Ltd"
///
/// [models."bluetooth:v004Cp0001d0100"]
/// vendor = "Apple"
/// product = "Widget"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLookup {
    /// Company id (decimal string key) to name.
    #[serde(default)]
    pub companies: HashMap<String, String>,
    /// OUI `AA-BB-CC` to company name.
    #[serde(default)]
    pub ouis: HashMap<String, String>,
    /// Modalias to vendor/product names.
    #[serde(default)]
    pub models: HashMap<String, VendorModel>,
    /// Resolvable address `AA:BB:CC:DD:EE:FF` to identity.
    #[serde(default)]
    pub identities: HashMap<String, IdentityEntry>,
}

impl TableLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a company name.
    pub fn with_company(mut self, company_id: u16, name: impl Into<String>) -> Self {
        self.companies.insert(company_id.to_string(), name.into());
        self
    }

    /// Register an OUI company name; `oui` is `AA-BB-CC`.
    pub fn with_oui(mut self, oui: impl Into<String>, name: impl Into<String>) -> Self {
        self.ouis.insert(oui.into().to_uppercase(), name.into());
        self
    }

    /// Register a modalias.
    pub fn with_model(mut self, modalias: impl Into<String>, model: VendorModel) -> Self {
        self.models.insert(modalias.into(), model);
        self
    }

    /// Register an identity for a resolvable private address.
    pub fn with_identity(mut self, rpa: &BdAddr, identity: &BdAddr, random: bool) -> Self {
        self.identities.insert(
            rpa.to_string(),
            IdentityEntry {
                address: identity.to_string(),
                random,
            },
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
            && self.ouis.is_empty()
            && self.models.is_empty()
            && self.identities.is_empty()
    }
}

impl Lookup for TableLookup {
    fn company_name(&self, company_id: u16) -> Option<String> {
        self.companies.get(&company_id.to_string()).cloned()
    }

    fn oui_company(&self, address: &BdAddr) -> Option<String> {
        let [a, b, c] = address.oui();
        self.ouis.get(&format!("{a:02X}-{b:02X}-{c:02X}")).cloned()
    }

    fn vendor_model(&self, modalias: &str) -> Option<VendorModel> {
        self.models.get(modalias).cloned()
    }

    fn resolve_identity(&self, address: &BdAddr) -> Option<(BdAddr, AddressType)> {
        let entry = self.identities.get(&address.to_string())?;
        let identity = entry.address.parse().ok()?;
        let kind = if entry.random {
            AddressType::Random
        } else {
            AddressType::Public
        };
        Some((identity, kind))
    }
}

impl<T: Lookup + ?Sized> Lookup for &T {
    fn company_name(&self, company_id: u16) -> Option<String> {
        (**self).company_name(company_id)
    }

    fn oui_company(&self, address: &BdAddr) -> Option<String> {
        (**self).oui_company(address)
    }

    fn vendor_model(&self, modalias: &str) -> Option<VendorModel> {
        (**self).vendor_model(modalias)
    }

    fn resolve_identity(&self, address: &BdAddr) -> Option<(BdAddr, AddressType)> {
        (**self).resolve_identity(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_lookup_knows_nothing() {
        let addr = BdAddr([1, 2, 3, 4, 5, 6]);
        assert!(NoLookup.company_name(76).is_none());
        assert!(NoLookup.oui_company(&addr).is_none());
        assert!(NoLookup.vendor_model("usb:v1D6Bp0246d0540").is_none());
        assert!(NoLookup.resolve_identity(&addr).is_none());
    }

    #[test]
    fn test_table_lookup_builders() {
        let rpa: BdAddr = "4A:00:00:00:00:01".parse().unwrap();
        let identity: BdAddr = "00:1A:7D:00:00:02".parse().unwrap();
        let lookup = TableLookup::new()
            .with_company(76, "Apple, Inc.")
            .with_oui("00-1a-7d", "cyber-blue(HK)Ltd")
            .with_identity(&rpa, &identity, false);

        assert_eq!(lookup.company_name(76).as_deref(), Some("Apple, Inc."));
        assert!(lookup.company_name(77).is_none());
        assert_eq!(
            lookup.oui_company(&identity).as_deref(),
            Some("cyber-blue(HK)Ltd")
        );
        assert_eq!(
            lookup.resolve_identity(&rpa),
            Some((identity, AddressType::Public))
        );
        assert!(!lookup.is_empty());
    }

    #[test]
    fn test_table_lookup_from_toml() {
        let text = r#"
            [companies]
            76 = "Apple, Inc."

            [models."bluetooth:v004Cp0001d0100"]
            vendor = "Apple"
        "#;
        let lookup: TableLookup = toml::from_str(text).unwrap();
        assert_eq!(lookup.company_name(76).as_deref(), Some("Apple, Inc."));
        let model = lookup.vendor_model("bluetooth:v004Cp0001d0100").unwrap();
        assert_eq!(model.vendor.as_deref(), Some("Apple"));
        assert!(model.product.is_none());
    }
}
