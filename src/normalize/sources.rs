//! Raw row shapes for each scraper and their canonical mappings.
//!
//! Every column is optional: a header the scraper did not write and an
//! empty cell both deserialize to `None`.

use super::fields::{
    extract_sale_time, priority_letter, priority_letter_from_sale_text, priority_letter_from_text,
    standardize_date, standardize_time,
};
use crate::geo::address::extract_city;
use crate::records::CanonicalRecord;
use serde::Deserialize;

/// Placeholder the TN Ledger scraper writes for missing notice fields.
const NOT_FOUND: &str = "Not found";

/// The value when it holds real text.
fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(NOT_FOUND))
}

fn text(value: &Option<String>) -> String {
    present(value).unwrap_or_default().to_string()
}

// ─── ClearRecon ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClearReconRow {
    #[serde(rename = "SourceWebsite")]
    pub source_website: Option<String>,
    #[serde(rename = "TrusteeSaleNumber")]
    pub trustee_sale_number: Option<String>,
    #[serde(rename = "PropertyAddress")]
    pub property_address: Option<String>,
    #[serde(rename = "SaleDate")]
    pub sale_date: Option<String>,
    #[serde(rename = "CurrentBid")]
    pub current_bid: Option<String>,
}

impl ClearReconRow {
    pub fn normalize(&self) -> CanonicalRecord {
        let address = text(&self.property_address);
        CanonicalRecord {
            source: text(&self.source_website),
            date: standardize_date(&text(&self.sale_date)),
            time: String::new(),
            priority_letter: priority_letter_from_text(&address),
            firm: "ClearRecon".into(),
            city: extract_city(&address),
            address,
        }
    }
}

// ─── Phillip Jones Law ───────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhillipJonesRow {
    #[serde(rename = "SourceWebsite")]
    pub source_website: Option<String>,
    #[serde(rename = "CaseNumber")]
    pub case_number: Option<String>,
    #[serde(rename = "PropertyAddress")]
    pub property_address: Option<String>,
    #[serde(rename = "County")]
    pub county: Option<String>,
    #[serde(rename = "SaleDate")]
    pub sale_date: Option<String>,
    #[serde(rename = "SaleTime")]
    pub sale_time: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
}

impl PhillipJonesRow {
    pub fn normalize(&self) -> CanonicalRecord {
        let address = text(&self.property_address);
        CanonicalRecord {
            source: text(&self.source_website),
            date: standardize_date(&text(&self.sale_date)),
            time: standardize_time(&text(&self.sale_time)),
            priority_letter: priority_letter(&text(&self.county)),
            firm: "Phillip Jones Law".into(),
            city: extract_city(&address),
            address,
        }
    }
}

// ─── TN Ledger ───────────────────────────────────────────────────

/// A foreclosure notice from the list page, enriched from its detail page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TnLedgerRow {
    pub borrower_list: Option<String>,
    pub property_address_list: Option<String>,
    pub address_detail: Option<String>,
    pub advertised_auction_date_list: Option<String>,
    pub advertised_auction_date_detail: Option<String>,
    pub date_of_first_notice_list: Option<String>,
    pub details_url: Option<String>,
    pub attorney: Option<String>,
    pub substitute_trustee: Option<String>,
    pub sale_details_text: Option<String>,
}

impl TnLedgerRow {
    pub fn normalize(&self) -> CanonicalRecord {
        let address = present(&self.address_detail)
            .or_else(|| present(&self.property_address_list))
            .unwrap_or_default()
            .to_string();
        let date = present(&self.advertised_auction_date_detail)
            .or_else(|| present(&self.advertised_auction_date_list))
            .unwrap_or_default();
        let sale_text = text(&self.sale_details_text);

        let mut letter = priority_letter_from_text(&address);
        if letter.is_empty() {
            letter = priority_letter_from_sale_text(&sale_text);
        }

        let firm = present(&self.substitute_trustee)
            .or_else(|| present(&self.attorney))
            .unwrap_or("TN Ledger")
            .to_string();

        CanonicalRecord {
            source: present(&self.details_url).unwrap_or("tnledger.com").to_string(),
            date: standardize_date(date),
            time: extract_sale_time(&sale_text),
            priority_letter: letter,
            firm,
            city: extract_city(&address),
            address,
        }
    }
}

// ─── Logs.com PowerBI feed ───────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PowerBiRow {
    #[serde(rename = "SourceWebsite")]
    pub source_website: Option<String>,
    #[serde(rename = "COUNTY_NAME")]
    pub county_name: Option<String>,
    #[serde(rename = "SALE_DATE")]
    pub sale_date: Option<String>,
    #[serde(rename = "SALE_TIME")]
    pub sale_time: Option<String>,
    #[serde(rename = "FULL_ADDRESS")]
    pub full_address: Option<String>,
    #[serde(rename = "BID_AMNT")]
    pub bid_amount: Option<String>,
}

impl PowerBiRow {
    pub fn normalize(&self) -> CanonicalRecord {
        let address = text(&self.full_address);
        CanonicalRecord {
            source: text(&self.source_website),
            date: standardize_date(&text(&self.sale_date)),
            time: standardize_time(&text(&self.sale_time)),
            priority_letter: priority_letter(&text(&self.county_name)),
            firm: "Logs.com".into(),
            city: extract_city(&address),
            address,
        }
    }
}

// ─── Wilson & Associates ─────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WilsonRow {
    #[serde(rename = "SourceWebsite")]
    pub source_website: Option<String>,
    #[serde(rename = "SaleDate")]
    pub sale_date: Option<String>,
    #[serde(rename = "SaleTime")]
    pub sale_time: Option<String>,
    #[serde(rename = "PriorSaleDate")]
    pub prior_sale_date: Option<String>,
    #[serde(rename = "PropertyAddress")]
    pub property_address: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "County")]
    pub county: Option<String>,
    #[serde(rename = "State")]
    pub state: Option<String>,
    #[serde(rename = "ZipCode")]
    pub zip_code: Option<String>,
    #[serde(rename = "SaleLocation")]
    pub sale_location: Option<String>,
    #[serde(rename = "Auctioneer")]
    pub auctioneer: Option<String>,
}

impl WilsonRow {
    pub fn normalize(&self) -> CanonicalRecord {
        let address = text(&self.property_address);
        let city = match present(&self.city) {
            Some(c) => c.to_string(),
            None => extract_city(&address),
        };
        CanonicalRecord {
            source: text(&self.source_website),
            date: standardize_date(&text(&self.sale_date)),
            time: standardize_time(&text(&self.sale_time)),
            priority_letter: priority_letter(&text(&self.county)),
            firm: present(&self.auctioneer).unwrap_or("Wilson Associates").to_string(),
            city,
            address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_clearrecon_mapping() {
        let row = ClearReconRow {
            source_website: s("clearrecon-tn.com"),
            property_address: s("410 Cedar Ln, Lebanon, TN 37087, Wilson County"),
            sale_date: s("2025-08-14"),
            ..Default::default()
        };
        let rec = row.normalize();
        assert_eq!(rec.source, "clearrecon-tn.com");
        assert_eq!(rec.date, "08/14/2025");
        assert_eq!(rec.time, "");
        assert_eq!(rec.firm, "ClearRecon");
        assert_eq!(rec.city, "Lebanon");
        assert_eq!(rec.priority_letter, "W");
    }

    #[test]
    fn test_phillipjones_mapping() {
        let row = PhillipJonesRow {
            source_website: s("phillipjoneslaw.com"),
            property_address: s("12 Elm St, Antioch, TN 37013"),
            county: s("Davidson"),
            sale_date: s("7/4/2025"),
            sale_time: s("10:00 AM"),
            ..Default::default()
        };
        let rec = row.normalize();
        assert_eq!(rec.date, "07/04/2025");
        assert_eq!(rec.time, "10:00 AM");
        assert_eq!(rec.priority_letter, "D");
        assert_eq!(rec.firm, "Phillip Jones Law");
        assert_eq!(rec.city, "Antioch");
    }

    #[test]
    fn test_tnledger_prefers_detail_and_trustee() {
        let row = TnLedgerRow {
            property_address_list: s("1 List St"),
            address_detail: s("88 Detail Rd, Gallatin, TN 37066"),
            advertised_auction_date_list: s("07/01/2025"),
            advertised_auction_date_detail: s("July 8, 2025"),
            details_url: s("https://www.tnledger.com/Notices.aspx?id=1"),
            attorney: s("Rubin Lublin TN, PLLC"),
            substitute_trustee: s("Not found"),
            sale_details_text: s("on July 8, 2025 at 11:00 AM local time, at the Sumner County Courthouse, Sumner County, Tennessee"),
            ..Default::default()
        };
        let rec = row.normalize();
        assert_eq!(rec.address, "88 Detail Rd, Gallatin, TN 37066");
        assert_eq!(rec.date, "07/08/2025");
        assert_eq!(rec.time, "11:00 AM");
        assert_eq!(rec.firm, "Rubin Lublin TN, PLLC");
        assert_eq!(rec.priority_letter, "S");
        assert_eq!(rec.city, "Gallatin");
        assert_eq!(rec.source, "https://www.tnledger.com/Notices.aspx?id=1");
    }

    #[test]
    fn test_tnledger_fallbacks() {
        let row = TnLedgerRow {
            property_address_list: s("5 Oak Ave, Smyrna, TN 37167"),
            advertised_auction_date_list: s("08/02/2025"),
            substitute_trustee: s("Not found"),
            attorney: s(""),
            ..Default::default()
        };
        let rec = row.normalize();
        assert_eq!(rec.address, "5 Oak Ave, Smyrna, TN 37167");
        assert_eq!(rec.date, "08/02/2025");
        assert_eq!(rec.firm, "TN Ledger");
        assert_eq!(rec.source, "tnledger.com");
        assert_eq!(rec.time, "");
        assert_eq!(rec.priority_letter, "");
    }

    #[test]
    fn test_powerbi_mapping() {
        let row = PowerBiRow {
            source_website: s("logs.com"),
            county_name: s("rutherford"),
            sale_date: s("2025-09-03 00:00:00"),
            sale_time: s("13:00"),
            full_address: s("300 Fox Run, Murfreesboro, TN 37130"),
            bid_amount: s("150000"),
        };
        let rec = row.normalize();
        assert_eq!(rec.priority_letter, "R");
        assert_eq!(rec.date, "09/03/2025");
        assert_eq!(rec.time, "01:00 PM");
        assert_eq!(rec.firm, "Logs.com");
        assert_eq!(rec.city, "Murfreesboro");
    }

    #[test]
    fn test_wilson_explicit_city_and_auctioneer() {
        let row = WilsonRow {
            source_website: s("wilson-assoc.com"),
            property_address: s("71 Lake Dr"),
            city: s("Hendersonville"),
            county: s("Sumner"),
            sale_date: s("08/20/2025"),
            sale_time: s("12:00 PM"),
            auctioneer: s("Jane Roe, Auctioneer"),
            ..Default::default()
        };
        let rec = row.normalize();
        assert_eq!(rec.city, "Hendersonville");
        assert_eq!(rec.firm, "Jane Roe, Auctioneer");
        assert_eq!(rec.priority_letter, "S");
    }

    #[test]
    fn test_wilson_defaults() {
        let row = WilsonRow {
            property_address: s("71 Lake Dr, Old Hickory, TN 37138"),
            ..Default::default()
        };
        let rec = row.normalize();
        assert_eq!(rec.city, "Old Hickory");
        assert_eq!(rec.firm, "Wilson Associates");
        assert_eq!(rec.priority_letter, "");
        assert_eq!(rec.date, "");
    }

    #[test]
    fn test_missing_everything_degrades_to_empty() {
        let rec = PhillipJonesRow::default().normalize();
        assert_eq!(rec.address, "");
        assert_eq!(rec.city, "");
        assert_eq!(rec.priority_letter, "");
        assert_eq!(rec.firm, "Phillip Jones Law");
    }
}
