//! Schema normalizer: maps each scraper's table onto [`CanonicalRecord`].
//!
//! One row type per source (see [`sources`]), wrapped in
//! [`RawSourceRecord`] and dispatched by [`SourceKind`].

pub mod fields;
pub mod sources;

use crate::error::PipelineError;
use crate::records::CanonicalRecord;
use serde::de::DeserializeOwned;
use sources::{ClearReconRow, PhillipJonesRow, PowerBiRow, TnLedgerRow, WilsonRow};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// The five supported listing sources, in concatenation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    ClearRecon,
    PhillipJones,
    TnLedger,
    PowerBi,
    Wilson,
}

impl SourceKind {
    /// Concatenation order; earlier sources win on duplicates.
    pub const ALL: [SourceKind; 5] = [
        SourceKind::ClearRecon,
        SourceKind::PhillipJones,
        SourceKind::TnLedger,
        SourceKind::PowerBi,
        SourceKind::Wilson,
    ];

    /// Short identifier used in logs and the HTTP status body.
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::ClearRecon => "clearrecon",
            SourceKind::PhillipJones => "phillipjoneslaw",
            SourceKind::TnLedger => "tnledger",
            SourceKind::PowerBi => "wabipowerbi",
            SourceKind::Wilson => "wilson",
        }
    }

    /// File the scraper for this source writes into the input directory.
    pub fn default_file_name(self) -> &'static str {
        match self {
            SourceKind::ClearRecon => "clearrecon_tn_foreclosures.csv",
            SourceKind::PhillipJones => "phillipjoneslaw_foreclosures.csv",
            SourceKind::TnLedger => "foreclosure_notices_tnledger_detailed.csv",
            SourceKind::PowerBi => "logs_com_powerbi_data.csv",
            SourceKind::Wilson => "wilson_assoc_foreclosures.csv",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row as read from a scraper's CSV.
#[derive(Debug, Clone)]
pub enum RawSourceRecord {
    ClearRecon(ClearReconRow),
    PhillipJones(PhillipJonesRow),
    TnLedger(TnLedgerRow),
    PowerBi(PowerBiRow),
    Wilson(WilsonRow),
}

impl RawSourceRecord {
    pub fn kind(&self) -> SourceKind {
        match self {
            RawSourceRecord::ClearRecon(_) => SourceKind::ClearRecon,
            RawSourceRecord::PhillipJones(_) => SourceKind::PhillipJones,
            RawSourceRecord::TnLedger(_) => SourceKind::TnLedger,
            RawSourceRecord::PowerBi(_) => SourceKind::PowerBi,
            RawSourceRecord::Wilson(_) => SourceKind::Wilson,
        }
    }

    pub fn normalize(&self) -> CanonicalRecord {
        match self {
            RawSourceRecord::ClearRecon(r) => r.normalize(),
            RawSourceRecord::PhillipJones(r) => r.normalize(),
            RawSourceRecord::TnLedger(r) => r.normalize(),
            RawSourceRecord::PowerBi(r) => r.normalize(),
            RawSourceRecord::Wilson(r) => r.normalize(),
        }
    }
}

/// Normalize every row of one source table.
///
/// Rows belonging to a different source are skipped.
pub fn normalize_table(kind: SourceKind, rows: &[RawSourceRecord]) -> Vec<CanonicalRecord> {
    rows.iter()
        .filter(|r| {
            let matches = r.kind() == kind;
            if !matches {
                debug!(expected = %kind, found = %r.kind(), "row from another source skipped");
            }
            matches
        })
        .map(RawSourceRecord::normalize)
        .collect()
}

// ─── CSV loading ─────────────────────────────────────────────────

/// Read a scraper table. Rows that fail to deserialize are logged and skipped;
/// only I/O failures abort the read.
pub fn read_csv<R: Read>(kind: SourceKind, reader: R) -> Result<Vec<RawSourceRecord>, csv::Error> {
    match kind {
        SourceKind::ClearRecon => read_rows(kind, reader, RawSourceRecord::ClearRecon),
        SourceKind::PhillipJones => read_rows(kind, reader, RawSourceRecord::PhillipJones),
        SourceKind::TnLedger => read_rows(kind, reader, RawSourceRecord::TnLedger),
        SourceKind::PowerBi => read_rows(kind, reader, RawSourceRecord::PowerBi),
        SourceKind::Wilson => read_rows(kind, reader, RawSourceRecord::Wilson),
    }
}

fn read_rows<R, T, F>(kind: SourceKind, reader: R, wrap: F) -> Result<Vec<RawSourceRecord>, csv::Error>
where
    R: Read,
    T: DeserializeOwned,
    F: Fn(T) -> RawSourceRecord,
{
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(wrap(row)),
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => warn!(source = %kind, row = i + 1, error = %e, "unreadable row skipped"),
        }
    }
    Ok(rows)
}

/// Open and read one scraper file.
pub fn load_file(kind: SourceKind, path: &Path) -> Result<Vec<RawSourceRecord>, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(read_csv(kind, file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_source_order_and_names() {
        let names: Vec<_> = SourceKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, ["clearrecon", "phillipjoneslaw", "tnledger", "wabipowerbi", "wilson"]);
        assert_eq!(SourceKind::PowerBi.default_file_name(), "logs_com_powerbi_data.csv");
    }

    #[test]
    fn test_read_by_header_name() {
        let data = "\
SaleDate,County,PropertyAddress,SourceWebsite,SaleTime
7/10/2025,Davidson,\"12 Elm St, Antioch, TN 37013\",phillipjoneslaw.com,10:00 AM
";
        let rows = read_csv(SourceKind::PhillipJones, data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let rec = rows[0].normalize();
        assert_eq!(rec.address, "12 Elm St, Antioch, TN 37013");
        assert_eq!(rec.date, "07/10/2025");
        assert_eq!(rec.priority_letter, "D");
        assert_eq!(rec.city, "Antioch");
    }

    #[test]
    fn test_missing_columns_degrade() {
        // No County column at all.
        let data = "PropertyAddress,SaleDate\n\"9 Oak Ave, Smyrna, TN\",08/01/2025\n";
        let rows = read_csv(SourceKind::PhillipJones, data.as_bytes()).unwrap();
        let rec = rows[0].normalize();
        assert_eq!(rec.priority_letter, "");
        assert_eq!(rec.city, "Smyrna");
        assert_eq!(rec.time, "");
    }

    #[test]
    fn test_short_rows_tolerated() {
        let data = "SourceWebsite,PropertyAddress,SaleDate,CurrentBid\nclearrecon-tn.com,1 A St\n";
        let rows = read_csv(SourceKind::ClearRecon, data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].normalize().date, "");
    }

    #[test]
    fn test_empty_table() {
        let rows = read_csv(SourceKind::Wilson, "".as_bytes()).unwrap();
        assert!(rows.is_empty());
        assert!(normalize_table(SourceKind::Wilson, &rows).is_empty());
    }

    #[test]
    fn test_normalize_table_filters_kind() {
        let rows = vec![
            RawSourceRecord::PowerBi(PowerBiRow::default()),
            RawSourceRecord::Wilson(WilsonRow::default()),
        ];
        let out = normalize_table(SourceKind::Wilson, &rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].firm, "Wilson Associates");
    }

    #[test]
    fn test_load_file_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SourceKind::PowerBi.default_file_name());
        let mut f = File::create(&path).unwrap();
        writeln!(f, "COUNTY_NAME,FULL_ADDRESS,SALE_DATE").unwrap();
        writeln!(f, "Wilson,\"3 Pine Ct, Lebanon, TN 37087\",2025-08-05").unwrap();
        drop(f);

        let rows = load_file(SourceKind::PowerBi, &path).unwrap();
        assert_eq!(rows[0].kind(), SourceKind::PowerBi);
        assert_eq!(rows[0].normalize().priority_letter, "W");

        let missing = load_file(SourceKind::Wilson, &dir.path().join("nope.csv"));
        assert!(matches!(missing, Err(PipelineError::Io { .. })));
    }
}
