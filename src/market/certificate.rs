//! Waste diversion certificates

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use super::model::User;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub certificate_id: String,
    pub company: String,
    pub location: String,
    pub issue_date: String,
    pub fiscal_year: i32,
    pub statement: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CertificateError {
    #[error("Complete your company name, description and location to receive a certificate")]
    IncompleteProfile,
}

/// Issue a certificate for `user` as of `now`
pub fn issue(user: &User, now: DateTime<Utc>) -> Result<Certificate, CertificateError> {
    let location = user
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or(CertificateError::IncompleteProfile)?;
    if user.company.trim().is_empty() || !user.profile_complete() {
        return Err(CertificateError::IncompleteProfile);
    }

    let year = now.year();
    let id_prefix: String = user.id.to_string().chars().take(8).collect();

    Ok(Certificate {
        certificate_id: format!("REVO-{}-{}", year, id_prefix.to_uppercase()),
        company: user.company.clone(),
        location: location.to_string(),
        issue_date: now.format("%-d %B %Y").to_string(),
        fiscal_year: year,
        statement: format!(
            "{} has successfully diverted industrial waste from landfills through the REVO \
             platform during the fiscal year {}.",
            user.company, year
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::model::fixtures::user;
    use chrono::TimeZone;

    #[test]
    fn issues_for_complete_profiles() {
        let mut owner = user(0xabcdef12_3456_7890_abcd_ef1234567890, "Asha");
        owner.company_description = Some("Recycles PET bottles into flakes".into());
        owner.location = Some("Pune".into());

        let now = Utc.with_ymd_and_hms(2026, 3, 7, 9, 0, 0).unwrap();
        let cert = issue(&owner, now).unwrap();

        assert_eq!(cert.certificate_id, "REVO-2026-ABCDEF12");
        assert_eq!(cert.issue_date, "7 March 2026");
        assert_eq!(cert.fiscal_year, 2026);
        assert!(cert.statement.starts_with("Asha Industries has successfully"));
    }

    #[test]
    fn refuses_incomplete_profiles() {
        let owner = user(1, "Asha");
        let now = Utc.with_ymd_and_hms(2026, 3, 7, 9, 0, 0).unwrap();
        assert_eq!(issue(&owner, now), Err(CertificateError::IncompleteProfile));
    }
}
