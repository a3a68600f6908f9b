//! Brand catalog repository.
//!
//! `approved_brands/{silo}` maps a content silo to its approved affiliate
//! brands. `partners/{id}` lists partner names with an `is_active` flag.

use tracing::warn;
use vscore_models::ApprovedBrand;

use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::types::{Document, StructuredQuery, ToFirestoreValue};

pub const APPROVED_BRANDS_COLLECTION: &str = "approved_brands";
pub const PARTNERS_COLLECTION: &str = "partners";

/// Repository for approved brands and partners.
#[derive(Clone)]
pub struct BrandRepository {
    client: FirestoreClient,
}

impl BrandRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Approved brand for a silo (silo IDs are case-insensitive).
    pub async fn get_approved_brand(&self, silo: &str) -> FirestoreResult<Option<ApprovedBrand>> {
        let doc_id = silo_doc_id(silo);
        if doc_id.is_empty() {
            return Ok(None);
        }

        let client = &self.client;
        let doc_id = doc_id.as_str();
        let doc = client
            .with_retry("get_approved_brand", move || {
                client.get_document(APPROVED_BRANDS_COLLECTION, doc_id)
            })
            .await?;

        Ok(doc.and_then(|d| document_to_brand(&d, silo)))
    }

    /// Names of active partners, sorted.
    pub async fn list_active_partners(&self) -> FirestoreResult<Vec<String>> {
        let query = StructuredQuery::collection(PARTNERS_COLLECTION)
            .filter_eq("is_active", true.to_firestore_value());

        let client = &self.client;
        let docs = client
            .with_retry("list_active_partners", move || client.run_query(query.clone()))
            .await?;

        let mut names: Vec<String> = docs.iter().filter_map(partner_name).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Normalized document ID for a silo or partner name.
fn silo_doc_id(name: &str) -> String {
    name.trim().to_lowercase()
}

fn document_to_brand(doc: &Document, requested_silo: &str) -> Option<ApprovedBrand> {
    let primary: String = match doc.get::<String>("primary_brand") {
        Some(p) if !p.trim().is_empty() => p,
        _ => {
            warn!(silo = %requested_silo, "Approved brand document has no primary_brand");
            return None;
        }
    };

    Some(ApprovedBrand {
        silo: doc
            .get("silo")
            .unwrap_or_else(|| requested_silo.to_string()),
        primary_brand: primary,
        secondary_brand: doc
            .get::<String>("secondary_brand")
            .filter(|s| !s.trim().is_empty()),
    })
}

fn partner_name(doc: &Document) -> Option<String> {
    doc.get::<String>("name")
        .or_else(|| doc.doc_id().map(str::to_string))
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::types::Value;

    #[test]
    fn test_silo_doc_id_normalizes() {
        assert_eq!(silo_doc_id("  Home Security "), "home security");
    }

    #[test]
    fn test_brand_document_maps_null_secondary_to_none() {
        let mut fields = HashMap::new();
        fields.insert("silo".to_string(), "vpn".to_firestore_value());
        fields.insert("primary_brand".to_string(), "NordVPN".to_firestore_value());
        fields.insert("secondary_brand".to_string(), Value::NullValue(()));

        let brand = document_to_brand(&Document::new(fields), "VPN");
        assert_eq!(
            brand,
            Some(ApprovedBrand {
                silo: "vpn".into(),
                primary_brand: "NordVPN".into(),
                secondary_brand: None,
            })
        );
    }

    #[test]
    fn test_missing_silo_field_uses_requested_silo() {
        let mut fields = HashMap::new();
        fields.insert("primary_brand".to_string(), "Ring".to_firestore_value());
        fields.insert("secondary_brand".to_string(), "SimpliSafe".to_firestore_value());

        let brand = document_to_brand(&Document::new(fields), "home security").unwrap();
        assert_eq!(brand.silo, "home security");
        assert_eq!(brand.secondary_brand.as_deref(), Some("SimpliSafe"));
    }

    #[test]
    fn test_brand_without_primary_is_ignored() {
        let mut fields = HashMap::new();
        fields.insert("primary_brand".to_string(), "  ".to_firestore_value());
        assert!(document_to_brand(&Document::new(fields), "x").is_none());
    }

    #[test]
    fn test_partner_name_falls_back_to_doc_id() {
        let mut doc = Document::new(HashMap::new());
        doc.name = Some("projects/p/databases/(default)/documents/partners/acme".into());
        assert_eq!(partner_name(&doc).as_deref(), Some("acme"));
    }
}
