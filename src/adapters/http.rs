//! Live registry source over HTTP.
//!
//! One GET per lookup: the company name goes in the `name` query
//! parameter and the configured token in the `Authorization` header. The
//! registry answers with an envelope — `result` (the company payload or
//! null), `reason`, and `error_code`, where `0` is success and `300000`
//! means no company matched. Wire-to-record normalization happens here:
//! the nested classification object is flattened into the four level
//! fields, millisecond-epoch values become proper timestamps (zero means
//! absent), and numeric flags are decoded.

use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;

use crate::ports::source::{LookupFuture, RegistrySource, SourceError};
use crate::record::{CompanyProfile, SourceRecord};

/// The registry's error code for "no company under this name".
const NOT_FOUND_CODE: i64 = 300_000;

/// Live registry client holding one persistent HTTP client.
pub struct HttpRegistrySource {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpRegistrySource {
    /// Builds a source for the given endpoint and bearer token. The
    /// timeout applies to each lookup call end-to-end.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be built.
    pub fn new(
        endpoint: String,
        token: String,
        timeout: std::time::Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(Box::new(e)))?;
        Ok(Self { client, endpoint, token })
    }
}

impl RegistrySource for HttpRegistrySource {
    fn lookup(&self, name: &str) -> LookupFuture<'_> {
        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("name", name)])
            .header(AUTHORIZATION, &self.token);
        Box::pin(async move {
            let response =
                request.send().await.map_err(|e| SourceError::Transport(Box::new(e)))?;
            let response =
                response.error_for_status().map_err(|e| SourceError::Transport(Box::new(e)))?;
            let envelope: LookupEnvelope =
                response.json().await.map_err(|e| SourceError::Decode(Box::new(e)))?;
            envelope.into_record()
        })
    }
}

/// Top-level response envelope.
#[derive(Deserialize)]
struct LookupEnvelope {
    result: Option<CompanyPayload>,
    #[serde(default)]
    reason: String,
    error_code: i64,
}

impl LookupEnvelope {
    fn into_record(self) -> Result<SourceRecord, SourceError> {
        match self.error_code {
            0 => match self.result {
                Some(payload) => Ok(payload.into_record()),
                None => Err(SourceError::Decode("success envelope carried no result".into())),
            },
            NOT_FOUND_CODE => Err(SourceError::NotFound),
            code => Err(SourceError::Remote { code, reason: self.reason }),
        }
    }
}

/// Company payload exactly as the registry spells it. Every field is
/// defaulted because the registry omits what it does not know.
#[derive(Default, Deserialize)]
#[serde(default)]
struct CompanyPayload {
    id: i64,
    name: String,
    #[serde(rename = "regStatus")]
    reg_status: String,
    #[serde(rename = "regNumber")]
    reg_number: String,
    #[serde(rename = "creditCode")]
    credit_code: String,
    #[serde(rename = "taxNumber")]
    tax_number: String,
    #[serde(rename = "orgNumber")]
    org_number: String,
    #[serde(rename = "legalPersonName")]
    legal_person_name: String,
    #[serde(rename = "type")]
    legal_person_type: i64,
    #[serde(rename = "regCapital")]
    reg_capital: String,
    #[serde(rename = "actualCapital")]
    actual_capital: String,
    #[serde(rename = "regCapitalCurrency")]
    reg_capital_currency: String,
    #[serde(rename = "actualCapitalCurrency")]
    actual_capital_currency: String,
    #[serde(rename = "companyOrgType")]
    company_org_type: String,
    industry: String,
    #[serde(rename = "industryAll")]
    industry_all: ClassificationPayload,
    #[serde(rename = "staffNumRange")]
    staff_num_range: String,
    #[serde(rename = "socialStaffNum")]
    social_staff_num: i64,
    #[serde(rename = "percentileScore")]
    percentile_score: i64,
    #[serde(rename = "isMicroEnt")]
    is_micro_ent: i64,
    // The registry itself spells this field "estiblishTime".
    #[serde(rename = "estiblishTime")]
    establish_time: i64,
    #[serde(rename = "approvedTime")]
    approved_time: i64,
    #[serde(rename = "fromTime")]
    from_time: i64,
    #[serde(rename = "toTime")]
    to_time: i64,
    #[serde(rename = "revokeDate")]
    revoke_date: i64,
    #[serde(rename = "revokeReason")]
    revoke_reason: String,
    #[serde(rename = "cancelDate")]
    cancel_date: i64,
    #[serde(rename = "cancelReason")]
    cancel_reason: String,
    #[serde(rename = "businessScope")]
    business_scope: String,
    #[serde(rename = "regLocation")]
    reg_location: String,
    base: String,
    #[serde(rename = "regInstitute")]
    reg_institute: String,
    #[serde(rename = "property3")]
    name_en: String,
    alias: String,
    #[serde(rename = "historyNames")]
    history_names: String,
    tags: String,
    #[serde(rename = "bondName")]
    bond_name: String,
    #[serde(rename = "bondNum")]
    bond_num: String,
    #[serde(rename = "bondType")]
    bond_type: String,
    #[serde(rename = "usedBondName")]
    used_bond_name: String,
}

/// Nested national-classification object, flattened at ingestion.
#[derive(Default, Deserialize)]
#[serde(default)]
struct ClassificationPayload {
    category: String,
    #[serde(rename = "categoryBig")]
    category_big: String,
    #[serde(rename = "categoryMiddle")]
    category_middle: String,
    #[serde(rename = "categorySmall")]
    category_small: String,
}

/// Converts a millisecond epoch to a timestamp; zero means absent.
fn ms_epoch(ms: i64) -> Option<DateTime<Utc>> {
    if ms == 0 {
        None
    } else {
        DateTime::from_timestamp_millis(ms)
    }
}

impl CompanyPayload {
    fn into_record(self) -> SourceRecord {
        SourceRecord {
            registry_id: self.id,
            name: self.name,
            profile: CompanyProfile {
                reg_status: self.reg_status,
                reg_number: self.reg_number,
                credit_code: self.credit_code,
                tax_number: self.tax_number,
                org_number: self.org_number,
                legal_rep_name: self.legal_person_name,
                legal_rep_kind: self.legal_person_type,
                reg_capital: self.reg_capital,
                paid_capital: self.actual_capital,
                reg_capital_currency: self.reg_capital_currency,
                paid_capital_currency: self.actual_capital_currency,
                org_type: self.company_org_type,
                industry: self.industry,
                industry_l1: self.industry_all.category,
                industry_l2: self.industry_all.category_big,
                industry_l3: self.industry_all.category_middle,
                industry_l4: self.industry_all.category_small,
                staff_range: self.staff_num_range,
                insured_count: self.social_staff_num,
                score: self.percentile_score,
                is_micro: self.is_micro_ent == 1,
                founded_at: ms_epoch(self.establish_time),
                approved_at: ms_epoch(self.approved_time),
                term_start: ms_epoch(self.from_time),
                term_end: ms_epoch(self.to_time),
                revoked_at: ms_epoch(self.revoke_date),
                revoke_reason: self.revoke_reason,
                cancelled_at: ms_epoch(self.cancel_date),
                cancel_reason: self.cancel_reason,
                business_scope: self.business_scope,
                reg_location: self.reg_location,
                province: self.base,
                reg_institute: self.reg_institute,
                name_en: self.name_en,
                short_name: self.alias,
                former_names: self.history_names,
                tags: self.tags,
                bond_name: self.bond_name,
                bond_num: self.bond_num,
                bond_type: self.bond_type,
                former_bond_name: self.used_bond_name,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn decode(json: &str) -> LookupEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn success_envelope_decodes_and_flattens() {
        let envelope = decode(
            r#"{
                "error_code": 0,
                "reason": "ok",
                "result": {
                    "id": 42,
                    "name": "Acme Widgets Ltd",
                    "regStatus": "in business",
                    "creditCode": "91310000MA1FL0000X",
                    "staffNumRange": "100-499",
                    "socialStaffNum": 120,
                    "isMicroEnt": 1,
                    "estiblishTime": 1236988800000,
                    "fromTime": 0,
                    "industryAll": {
                        "category": "manufacturing",
                        "categoryBig": "machinery",
                        "categoryMiddle": "widgets",
                        "categorySmall": "industrial widgets"
                    }
                }
            }"#,
        );

        let record = envelope.into_record().unwrap();

        assert_eq!(record.registry_id, 42);
        assert_eq!(record.name, "Acme Widgets Ltd");
        assert_eq!(record.profile.industry_l1, "manufacturing");
        assert_eq!(record.profile.industry_l2, "machinery");
        assert_eq!(record.profile.industry_l3, "widgets");
        assert_eq!(record.profile.industry_l4, "industrial widgets");
        assert_eq!(record.profile.staff_range, "100-499");
        assert!(record.profile.is_micro);
        assert_eq!(
            record.profile.founded_at,
            Utc.with_ymd_and_hms(2009, 3, 14, 0, 0, 0).single()
        );
        // Zero millisecond epoch decodes as absent.
        assert_eq!(record.profile.term_start, None);
        assert_eq!(record.profile.revoked_at, None);
    }

    #[test]
    fn missing_fields_default() {
        let envelope = decode(r#"{"error_code": 0, "result": {"id": 7, "name": "Acme"}}"#);

        let record = envelope.into_record().unwrap();

        assert_eq!(record.profile.reg_status, "");
        assert!(!record.profile.is_micro);
        assert_eq!(record.profile.founded_at, None);
    }

    #[test]
    fn not_found_code_maps_to_not_found() {
        let envelope =
            decode(r#"{"error_code": 300000, "reason": "company not found", "result": null}"#);

        assert!(matches!(envelope.into_record(), Err(SourceError::NotFound)));
    }

    #[test]
    fn other_codes_map_to_remote_error() {
        let envelope =
            decode(r#"{"error_code": 300001, "reason": "quota exhausted", "result": null}"#);

        match envelope.into_record() {
            Err(SourceError::Remote { code, reason }) => {
                assert_eq!(code, 300_001);
                assert_eq!(reason, "quota exhausted");
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[test]
    fn success_without_result_is_a_decode_error() {
        let envelope = decode(r#"{"error_code": 0, "reason": "ok", "result": null}"#);

        assert!(matches!(envelope.into_record(), Err(SourceError::Decode(_))));
    }
}
