use tracing::debug;

use crate::error::{PassbookError, Result};
use crate::models::{BankConfig, FileKind, RawRow};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn skip_lines(data: &[u8], count: usize) -> &[u8] {
    let mut rest = data;
    for _ in 0..count {
        match rest.iter().position(|&b| b == b'\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return &[],
        }
    }
    rest
}

fn check_columns(headers: &[String], config: &BankConfig) -> Result<()> {
    let missing: Vec<String> = config
        .columns
        .names()
        .into_iter()
        .filter(|name| !headers.iter().any(|h| h == name))
        .map(String::from)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PassbookError::MissingColumns(missing))
    }
}

fn build_row<'a>(headers: &[String], cells: impl Fn(usize) -> Option<&'a str>) -> RawRow {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.clone(), cells(i).unwrap_or("").to_string()))
        .collect()
}

#[cfg(any(feature = "excel", test))]
pub fn excel_serial_to_date(serial: f64) -> Option<chrono::NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = chrono::Duration::try_days(serial.floor() as i64)?;
    base.checked_add_signed(days)
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

/// Read raw statement bytes into rows keyed by the file's header names.
///
/// Cell contents are not validated here; every column named in the config
/// must exist in the header row.
pub fn parse(data: &[u8], config: &BankConfig) -> Result<Vec<RawRow>> {
    let rows = match config.file_kind {
        FileKind::Csv => parse_csv(data, config)?,
        FileKind::Excel => parse_excel(data, config)?,
    };
    debug!(format = config.key, rows = rows.len(), "parsed statement");
    Ok(rows)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn parse_csv(data: &[u8], config: &BankConfig) -> Result<Vec<RawRow>> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let body = skip_lines(data, config.header_row);
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(PassbookError::MalformedFile(format!(
            "no header row found after skipping {} line(s)",
            config.header_row
        )));
    }
    check_columns(&headers, config)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = build_row(&headers, |i| record.get(i));
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Spreadsheets (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "excel")]
fn parse_excel(data: &[u8], config: &BankConfig) -> Result<Vec<RawRow>> {
    use calamine::Reader;

    let sheet = config.sheet_name.ok_or_else(|| {
        PassbookError::MalformedFile(format!("format {} names no sheet", config.key))
    })?;
    let mut workbook = calamine::open_workbook_auto_from_rs(std::io::Cursor::new(data))
        .map_err(|e| PassbookError::MalformedFile(format!("Failed to open workbook: {e}")))?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| PassbookError::MalformedFile(format!("Sheet '{sheet}': {e}")))?;
    rows_from_range(&range, config)
}

#[cfg(not(feature = "excel"))]
fn parse_excel(_data: &[u8], config: &BankConfig) -> Result<Vec<RawRow>> {
    Err(PassbookError::MalformedFile(format!(
        "format {} needs spreadsheet support (build with the `excel` feature)",
        config.key
    )))
}

#[cfg(feature = "excel")]
fn rows_from_range(range: &calamine::Range<calamine::Data>, config: &BankConfig) -> Result<Vec<RawRow>> {
    // The used range may start below row 0 when the sheet has blank leading rows.
    let first_row = range.start().map_or(0, |(r, _)| r as usize);
    let mut rows_iter = range.rows().skip(config.header_row.saturating_sub(first_row));

    let Some(header_cells) = rows_iter.next() else {
        return Err(PassbookError::MalformedFile("sheet has no header row".to_string()));
    };
    let headers: Vec<String> = header_cells
        .iter()
        .map(|c| cell_text(c, config.date_format))
        .collect();
    check_columns(&headers, config)?;

    let mut rows = Vec::new();
    for cells in rows_iter {
        let texts: Vec<String> = cells.iter().map(|c| cell_text(c, config.date_format)).collect();
        let row = build_row(&headers, |i| texts.get(i).map(String::as_str));
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Render a cell as text. Date cells use the format's own date pattern so the
/// normalizer reads CSV and spreadsheet dates the same way.
#[cfg(feature = "excel")]
fn cell_text(cell: &calamine::Data, date_format: &str) -> String {
    use calamine::Data;
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(|d| d.format(date_format).to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s
            .get(..10)
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d.format(date_format).to_string())
            .unwrap_or_else(|| s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banks::{PAYTM_CSV, PAYTM_EXCEL};
    use crate::models::{AmountColumns, ColumnMap};

    const PAYTM_HEADER: &str = "Date,Time,Transaction Details,Other Transaction Details (UPI ID or A/c No),Your Account,Amount,UPI Ref No.,Order ID,Remarks,Tags,Comment";

    fn split_config() -> BankConfig {
        BankConfig {
            key: "test_split",
            name: "Test Split",
            file_kind: FileKind::Csv,
            columns: ColumnMap {
                date: "Txn Date",
                description: "Narration",
                amount: AmountColumns::Split {
                    debit: "Withdrawal",
                    credit: "Deposit",
                },
                tag: None,
            },
            date_format: "%Y-%m-%d",
            header_row: 2,
            sheet_name: None,
        }
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(45667.0),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 10)
        );
        assert_eq!(
            excel_serial_to_date(45285.75),
            chrono::NaiveDate::from_ymd_opt(2023, 12, 25)
        );
    }

    #[test]
    fn test_excel_serial_out_of_range() {
        assert_eq!(excel_serial_to_date(1e300), None);
        assert_eq!(excel_serial_to_date(-1e300), None);
        assert_eq!(excel_serial_to_date(f64::INFINITY), None);
        assert_eq!(excel_serial_to_date(1e10), None);
    }

    #[test]
    fn test_parse_paytm_csv() {
        let content = format!(
            "{PAYTM_HEADER}\n\
25/12/2023,18:02:11,Grocery Store,grocer@upi,Paytm Wallet,-500,1,,,#🛍 Shopping,\n\
26/12/2023,09:00:00,Salary Credit,acme@upi,HDFC Bank - 12,\"1,000.00\",2,,,#💰 Income,\n"
        );
        let rows = parse(content.as_bytes(), &PAYTM_CSV).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Date"), Some("25/12/2023"));
        assert_eq!(rows[0].get("Transaction Details"), Some("Grocery Store"));
        assert_eq!(rows[0].get("Tags"), Some("#🛍 Shopping"));
        assert_eq!(rows[1].get("Amount"), Some("1,000.00"));
    }

    #[test]
    fn test_parse_skips_header_offset_and_bom() {
        let content = "\u{feff}Statement for A/c 1234\nPeriod: 2024\n\
Txn Date,Narration,Withdrawal,Deposit\n\
2024-01-02,ATM,200,\n\
2024-01-03,Salary,,5000\n";
        let rows = parse(content.as_bytes(), &split_config()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Withdrawal"), Some("200"));
        assert_eq!(rows[1].get("Deposit"), Some("5000"));
    }

    #[test]
    fn test_parse_pads_ragged_rows_and_drops_blank_rows() {
        let content = "Txn Date,Narration,Withdrawal,Deposit\n\
2024-01-02,ATM,200\n\
,,,\n";
        let mut cfg = split_config();
        cfg.header_row = 0;
        let rows = parse(content.as_bytes(), &cfg).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Deposit"), Some(""));
    }

    #[test]
    fn test_parse_reports_missing_columns() {
        let content = "Date,Details,Amount\n25/12/2023,Shop,-5\n";
        let err = parse(content.as_bytes(), &PAYTM_CSV).unwrap_err();
        match err {
            PassbookError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Transaction Details".to_string(), "Tags".to_string()]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_trims_header_names() {
        let content = " Date , Transaction Details ,Amount, Tags\n25/12/2023,Shop,-5,\n";
        let rows = parse(content.as_bytes(), &PAYTM_CSV).unwrap();
        assert_eq!(rows[0].get("Transaction Details"), Some("Shop"));
    }

    #[test]
    fn test_parse_rejects_non_utf8() {
        let mut data = b"Date,Transaction Details,Amount,Tags\n".to_vec();
        data.extend_from_slice(b"25/12/2023,\xff\xfe,-5,\n");
        let err = parse(&data, &PAYTM_CSV).unwrap_err();
        assert!(matches!(err, PassbookError::MalformedFile(_)));
    }

    #[test]
    fn test_parse_rejects_empty_file() {
        let err = parse(b"", &PAYTM_CSV).unwrap_err();
        assert!(matches!(err, PassbookError::MalformedFile(_)));
    }

    #[test]
    fn test_parse_header_offset_past_end() {
        let mut cfg = split_config();
        cfg.header_row = 10;
        let err = parse(b"a,b\n1,2\n", &cfg).unwrap_err();
        assert!(matches!(err, PassbookError::MalformedFile(_)));
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_parse_excel_rejects_garbage() {
        let err = parse(b"definitely not a workbook", &PAYTM_EXCEL).unwrap_err();
        assert!(matches!(err, PassbookError::MalformedFile(_)));
    }

    #[cfg(not(feature = "excel"))]
    #[test]
    fn test_parse_excel_without_feature() {
        let err = parse(b"PK", &PAYTM_EXCEL).unwrap_err();
        assert!(matches!(err, PassbookError::MalformedFile(_)));
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_rows_from_range() {
        use calamine::{Data, Range};

        let mut range = Range::new((0, 0), (3, 4));
        let header = ["Date", "Transaction Details", "Amount", "Tags", "Comment"];
        for (c, h) in header.iter().enumerate() {
            range.set_value((0, c as u32), Data::String(h.to_string()));
        }
        range.set_value((1, 0), Data::String("25/12/2023".into()));
        range.set_value((1, 1), Data::String(" Grocery Store ".into()));
        range.set_value((1, 2), Data::Float(-500.0));
        range.set_value((1, 3), Data::String("#🛍 Shopping".into()));
        range.set_value((2, 0), Data::DateTimeIso("2023-12-26T00:00:00".into()));
        range.set_value((2, 1), Data::String("Cashback".into()));
        range.set_value((2, 2), Data::Int(25));
        // row 3 stays empty

        let rows = rows_from_range(&range, &PAYTM_EXCEL).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Transaction Details"), Some("Grocery Store"));
        assert_eq!(rows[0].get("Amount"), Some("-500"));
        assert_eq!(rows[1].get("Date"), Some("26/12/2023"));
        assert_eq!(rows[1].get("Amount"), Some("25"));
        assert_eq!(rows[1].get("Tags"), Some(""));
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_rows_from_range_header_offset_with_blank_leading_rows() {
        use calamine::{Data, Range};

        // Used range starts at row 1: a title, a blank row, then the header at row 3.
        let mut range = Range::new((1, 0), (5, 3));
        range.set_value((1, 0), Data::String("Paytm Passbook".into()));
        for (c, h) in ["Date", "Transaction Details", "Amount", "Tags"].iter().enumerate() {
            range.set_value((3, c as u32), Data::String(h.to_string()));
        }
        range.set_value((4, 0), Data::String("02/01/2024".into()));
        range.set_value((4, 1), Data::String("Swiggy".into()));
        range.set_value((4, 2), Data::Float(-350.0));
        range.set_value((5, 0), Data::String("03/01/2024".into()));
        range.set_value((5, 1), Data::String("Salary".into()));
        range.set_value((5, 2), Data::Int(40000));

        let cfg = BankConfig {
            header_row: 3,
            ..PAYTM_EXCEL
        };
        let rows = rows_from_range(&range, &cfg).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Transaction Details"), Some("Swiggy"));
        assert_eq!(rows[0].get("Amount"), Some("-350"));
        assert_eq!(rows[1].get("Date"), Some("03/01/2024"));
        assert_eq!(rows[1].get("Amount"), Some("40000"));

        // Header row inside the leading blank area still lands on the header.
        let mut range = Range::new((2, 0), (3, 3));
        for (c, h) in ["Date", "Transaction Details", "Amount", "Tags"].iter().enumerate() {
            range.set_value((2, c as u32), Data::String(h.to_string()));
        }
        range.set_value((3, 0), Data::String("04/01/2024".into()));
        range.set_value((3, 1), Data::String("Uber".into()));
        range.set_value((3, 2), Data::Float(-120.0));
        let cfg = BankConfig {
            header_row: 2,
            ..PAYTM_EXCEL
        };
        let rows = rows_from_range(&range, &cfg).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Transaction Details"), Some("Uber"));
    }

    /// Minimal xlsx: an uncompressed zip holding one inline-string worksheet.
    #[cfg(feature = "excel")]
    mod workbook {
        fn crc32(data: &[u8]) -> u32 {
            let mut crc = 0xFFFF_FFFFu32;
            for &b in data {
                crc ^= b as u32;
                for _ in 0..8 {
                    let mask = (crc & 1).wrapping_neg();
                    crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
                }
            }
            !crc
        }

        fn zip(files: &[(&str, String)]) -> Vec<u8> {
            let mut out = Vec::new();
            let mut central = Vec::new();
            for (name, body) in files {
                let offset = out.len() as u32;
                let crc = crc32(body.as_bytes());
                let size = body.len() as u32;
                let name_len = name.len() as u16;

                out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
                out.extend_from_slice(&20u16.to_le_bytes()); // version needed
                out.extend_from_slice(&0u16.to_le_bytes()); // flags
                out.extend_from_slice(&0u16.to_le_bytes()); // stored
                out.extend_from_slice(&0u16.to_le_bytes()); // time
                out.extend_from_slice(&0x21u16.to_le_bytes()); // date 1980-01-01
                out.extend_from_slice(&crc.to_le_bytes());
                out.extend_from_slice(&size.to_le_bytes());
                out.extend_from_slice(&size.to_le_bytes());
                out.extend_from_slice(&name_len.to_le_bytes());
                out.extend_from_slice(&0u16.to_le_bytes());
                out.extend_from_slice(name.as_bytes());
                out.extend_from_slice(body.as_bytes());

                central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
                central.extend_from_slice(&20u16.to_le_bytes()); // made by
                central.extend_from_slice(&20u16.to_le_bytes()); // needed
                central.extend_from_slice(&0u16.to_le_bytes());
                central.extend_from_slice(&0u16.to_le_bytes());
                central.extend_from_slice(&0u16.to_le_bytes());
                central.extend_from_slice(&0x21u16.to_le_bytes());
                central.extend_from_slice(&crc.to_le_bytes());
                central.extend_from_slice(&size.to_le_bytes());
                central.extend_from_slice(&size.to_le_bytes());
                central.extend_from_slice(&name_len.to_le_bytes());
                central.extend_from_slice(&0u16.to_le_bytes()); // extra
                central.extend_from_slice(&0u16.to_le_bytes()); // comment
                central.extend_from_slice(&0u16.to_le_bytes()); // disk
                central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
                central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
                central.extend_from_slice(&offset.to_le_bytes());
                central.extend_from_slice(name.as_bytes());
            }
            let cd_offset = out.len() as u32;
            let cd_size = central.len() as u32;
            let count = files.len() as u16;
            out.extend_from_slice(&central);
            out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&cd_size.to_le_bytes());
            out.extend_from_slice(&cd_offset.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out
        }

        fn cell(reference: &str, value: &str) -> String {
            match value.parse::<f64>() {
                Ok(_) => format!(r#"<c r="{reference}"><v>{value}</v></c>"#),
                Err(_) => format!(r#"<c r="{reference}" t="inlineStr"><is><t>{value}</t></is></c>"#),
            }
        }

        /// Sheet rows are numbered from 1; each entry is (row number, cells A..).
        pub fn xlsx(sheet_name: &str, rows: &[(u32, &[&str])]) -> Vec<u8> {
            let mut sheet_data = String::new();
            for (r, cells) in rows {
                sheet_data.push_str(&format!(r#"<row r="{r}">"#));
                for (c, value) in cells.iter().enumerate() {
                    let col = (b'A' + c as u8) as char;
                    sheet_data.push_str(&cell(&format!("{col}{r}"), value));
                }
                sheet_data.push_str("</row>");
            }
            let files = [
                (
                    "[Content_Types].xml",
                    concat!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
                        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
                        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
                        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
                        r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                        r#"</Types>"#
                    )
                    .to_string(),
                ),
                (
                    "_rels/.rels",
                    concat!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
                        r#"</Relationships>"#
                    )
                    .to_string(),
                ),
                (
                    "xl/workbook.xml",
                    format!(
                        concat!(
                            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
                            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
                        ),
                        sheet_name
                    ),
                ),
                (
                    "xl/_rels/workbook.xml.rels",
                    concat!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
                        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
                        r#"</Relationships>"#
                    )
                    .to_string(),
                ),
                (
                    "xl/worksheets/sheet1.xml",
                    format!(
                        concat!(
                            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
                            r#"<sheetData>{}</sheetData></worksheet>"#
                        ),
                        sheet_data
                    ),
                ),
            ];
            zip(&files)
        }
    }

    #[cfg(feature = "excel")]
    fn paytm_workbook(sheet_name: &str) -> Vec<u8> {
        workbook::xlsx(
            sheet_name,
            &[
                (1, &["Paytm Passbook"]),
                (3, &["Date", "Transaction Details", "Amount", "Tags"]),
                (4, &["25/12/2023", "Grocery Store", "-500", "#🛍 Shopping"]),
                (5, &["26/12/2023", "Cashback", "25"]),
            ],
        )
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_parse_workbook_named_sheet() {
        let cfg = BankConfig {
            header_row: 2,
            ..PAYTM_EXCEL
        };
        let rows = parse(&paytm_workbook("Passbook Payment History"), &cfg).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Date"), Some("25/12/2023"));
        assert_eq!(rows[0].get("Transaction Details"), Some("Grocery Store"));
        assert_eq!(rows[0].get("Amount"), Some("-500"));
        assert_eq!(rows[0].get("Tags"), Some("#🛍 Shopping"));
        assert_eq!(rows[1].get("Amount"), Some("25"));
        assert_eq!(rows[1].get("Tags"), Some(""));
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_parse_workbook_missing_sheet() {
        let err = parse(&paytm_workbook("Sheet1"), &PAYTM_EXCEL).unwrap_err();
        match err {
            PassbookError::MalformedFile(msg) => assert!(msg.contains("Passbook Payment History")),
            other => panic!("expected MalformedFile, got {other:?}"),
        }
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_rows_from_range_missing_columns() {
        use calamine::{Data, Range};

        let mut range = Range::new((0, 0), (0, 1));
        range.set_value((0, 0), Data::String("Date".into()));
        range.set_value((0, 1), Data::String("Amount".into()));
        let err = rows_from_range(&range, &PAYTM_EXCEL).unwrap_err();
        assert!(matches!(err, PassbookError::MissingColumns(_)));
    }
}
