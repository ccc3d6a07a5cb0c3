//! Workbook report serialization
//!
//! Builds the xlsx package directly: fixed package parts plus a generated
//! workbook part and one worksheet, zipped with deflate. Text lands in
//! inline string cells; the four amount columns carry the built-in `0.00`
//! number format so they always show two decimal places.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::Utc;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

use crate::error::WorkbookError;
use crate::models::record::{COLUMNS, CellValue, InvoiceTable};

/// Column widths in character units, one per report column.
const COLUMN_WIDTHS: [u32; 26] = [
    15, 15, 20, 15, 15, 15, 12, 12, 12, 10, 12, 15, 30, 15, 15, 30, 15, 15, 10, 40, 20, 70, 40,
    15, 12, 12,
];

/// Style index into `cellXfs` carrying the built-in `0.00` number format.
const DECIMAL_STYLE: &str = "1";

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const APP_PROPERTIES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>facturas</Application>
</Properties>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border/></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="2">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="2" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
</cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

/// Serialize the table into xlsx package bytes.
pub fn workbook_bytes(table: &InvoiceTable, sheet_name: &str) -> Result<Vec<u8>, WorkbookError> {
    let parts: [(&str, Vec<u8>); 8] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes().to_vec()),
        ("docProps/core.xml", core_properties()),
        ("docProps/app.xml", APP_PROPERTIES.as_bytes().to_vec()),
        ("xl/workbook.xml", workbook_part(sheet_name)?),
        (
            "xl/_rels/workbook.xml.rels",
            WORKBOOK_RELS.as_bytes().to_vec(),
        ),
        ("xl/styles.xml", STYLES.as_bytes().to_vec()),
        ("xl/worksheets/sheet1.xml", worksheet_part(table)?),
    ];

    let cursor = Cursor::new(Vec::new());
    let mut zip = zip::ZipWriter::new(cursor);
    let options = zip::write::FileOptions::<()>::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, bytes) in parts {
        zip.start_file(name, options)?;
        zip.write_all(&bytes)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Serialize the table and write the workbook file, replacing any existing
/// file at `path`.
pub fn write_workbook(
    path: &Path,
    table: &InvoiceTable,
    sheet_name: &str,
) -> Result<(), WorkbookError> {
    let bytes = workbook_bytes(table, sheet_name)?;
    fs::write(path, bytes)?;
    debug!("wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Package metadata part with the creation timestamp.
fn core_properties() -> Vec<u8> {
    let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>
</cp:coreProperties>"#,
        stamp, stamp
    )
    .into_bytes()
}

/// Workbook part naming the single worksheet.
fn workbook_part(sheet_name: &str) -> Result<Vec<u8>, WorkbookError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut workbook = BytesStart::new("workbook");
    workbook.push_attribute(("xmlns", SPREADSHEET_NS));
    workbook.push_attribute(("xmlns:r", RELATIONSHIPS_NS));
    writer.write_event(Event::Start(workbook))?;

    writer.write_event(Event::Start(BytesStart::new("sheets")))?;
    let mut sheet = BytesStart::new("sheet");
    sheet.push_attribute(("name", sheet_name));
    sheet.push_attribute(("sheetId", "1"));
    sheet.push_attribute(("r:id", "rId1"));
    writer.write_event(Event::Empty(sheet))?;
    writer.write_event(Event::End(BytesEnd::new("sheets")))?;

    writer.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(writer.into_inner())
}

/// The worksheet: column widths, the header row, then one row per record.
fn worksheet_part(table: &InvoiceTable) -> Result<Vec<u8>, WorkbookError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", SPREADSHEET_NS));
    writer.write_event(Event::Start(worksheet))?;

    writer.write_event(Event::Start(BytesStart::new("cols")))?;
    for (index, width) in COLUMN_WIDTHS.iter().enumerate() {
        let position = (index + 1).to_string();
        let width = width.to_string();
        let mut col = BytesStart::new("col");
        col.push_attribute(("min", position.as_str()));
        col.push_attribute(("max", position.as_str()));
        col.push_attribute(("width", width.as_str()));
        col.push_attribute(("customWidth", "1"));
        writer.write_event(Event::Empty(col))?;
    }
    writer.write_event(Event::End(BytesEnd::new("cols")))?;

    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    let header: Vec<CellValue> = COLUMNS.iter().map(|title| CellValue::text(*title)).collect();
    write_row(&mut writer, 1, &header)?;

    for (index, record) in table.rows().iter().enumerate() {
        write_row(&mut writer, index + 2, &record.cells())?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner())
}

/// Write one `<row>` element with its 26 cells.
fn write_row<W: Write>(
    writer: &mut Writer<W>,
    row: usize,
    cells: &[CellValue],
) -> Result<(), WorkbookError> {
    let row_ref = row.to_string();
    let mut row_start = BytesStart::new("row");
    row_start.push_attribute(("r", row_ref.as_str()));
    writer.write_event(Event::Start(row_start))?;

    for (index, cell) in cells.iter().enumerate() {
        let cell_ref = format!("{}{}", column_letter(index), row);
        match cell {
            CellValue::Text(text) => {
                let mut c = BytesStart::new("c");
                c.push_attribute(("r", cell_ref.as_str()));
                c.push_attribute(("t", "inlineStr"));
                writer.write_event(Event::Start(c))?;
                writer.write_event(Event::Start(BytesStart::new("is")))?;

                let mut t = BytesStart::new("t");
                if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                    t.push_attribute(("xml:space", "preserve"));
                }
                writer.write_event(Event::Start(t))?;
                writer.write_event(Event::Text(BytesText::new(text)))?;
                writer.write_event(Event::End(BytesEnd::new("t")))?;

                writer.write_event(Event::End(BytesEnd::new("is")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
            CellValue::Number(value) => {
                let rendered = value.to_string();
                let mut c = BytesStart::new("c");
                c.push_attribute(("r", cell_ref.as_str()));
                c.push_attribute(("s", DECIMAL_STYLE));
                writer.write_event(Event::Start(c))?;
                writer.write_event(Event::Start(BytesStart::new("v")))?;
                writer.write_event(Event::Text(BytesText::new(&rendered)))?;
                writer.write_event(Event::End(BytesEnd::new("v")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

/// Spreadsheet column letter for a zero-based index; the report never goes
/// past column Z.
fn column_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::InvoiceRecord;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::io::Read;
    use std::str::FromStr;

    fn sample_record(folio: &str, conceptos: &str) -> InvoiceRecord {
        InvoiceRecord {
            serie: "A".to_string(),
            folio: folio.to_string(),
            fecha: "2024-01-15T10:30:00".to_string(),
            tipo_comprobante: "I".to_string(),
            forma_pago: "01".to_string(),
            metodo_pago: "PUE".to_string(),
            sub_total: Decimal::from_str("100.00").unwrap(),
            descuento: Decimal::ZERO,
            total: Decimal::from_str("116.00").unwrap(),
            moneda: "MXN".to_string(),
            tipo_cambio: "1".to_string(),
            emisor_rfc: "AAA010101AAA".to_string(),
            emisor_nombre: "Emisor SA".to_string(),
            emisor_regimen: "601".to_string(),
            receptor_rfc: "XAXX010101000".to_string(),
            receptor_nombre: "Publico General".to_string(),
            receptor_uso_cfdi: "G03".to_string(),
            receptor_regimen: "616".to_string(),
            receptor_cp: "06000".to_string(),
            uuid: "AD662D33-6934-459C-A128-BDF0393F0F44".to_string(),
            fecha_timbrado: "2024-01-15T10:31:02".to_string(),
            url_verificacion: "N/A".to_string(),
            conceptos: conceptos.to_string(),
            impuestos_trasladados: Decimal::from_str("16.00").unwrap(),
            contiene_cafe: true,
            contiene_cerveza: false,
        }
    }

    fn sample_table() -> InvoiceTable {
        let mut table = InvoiceTable::new();
        table.push(sample_record("123", "Café de grano"));
        table.push(sample_record("124", r#"Taza "A" & <filtros>"#));
        table
    }

    fn part_text(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut text = String::new();
        part.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_package_has_expected_parts() {
        let bytes = workbook_bytes(&sample_table(), "Facturas").unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(names.contains(&expected), "missing part {}", expected);
        }
    }

    #[test]
    fn test_sheet_has_header_plus_one_row_per_record() {
        let bytes = workbook_bytes(&sample_table(), "Facturas").unwrap();
        let sheet = part_text(&bytes, "xl/worksheets/sheet1.xml");
        let document = roxmltree::Document::parse(&sheet).unwrap();

        let rows: Vec<_> = document
            .descendants()
            .filter(|node| node.has_tag_name((SPREADSHEET_NS, "row")))
            .collect();
        assert_eq!(rows.len(), 3);

        let header_first = rows[0]
            .descendants()
            .find(|node| node.has_tag_name((SPREADSHEET_NS, "t")))
            .unwrap();
        assert_eq!(header_first.text(), Some("Serie"));
    }

    #[test]
    fn test_amount_cells_are_numeric_with_decimal_style() {
        let bytes = workbook_bytes(&sample_table(), "Facturas").unwrap();
        let sheet = part_text(&bytes, "xl/worksheets/sheet1.xml");
        let document = roxmltree::Document::parse(&sheet).unwrap();

        let total = document
            .descendants()
            .find(|node| node.attribute("r") == Some("I2"))
            .unwrap();
        assert_eq!(total.attribute("s"), Some(DECIMAL_STYLE));
        assert_eq!(total.attribute("t"), None);

        let value = total
            .children()
            .find(|node| node.has_tag_name((SPREADSHEET_NS, "v")))
            .unwrap();
        assert_eq!(value.text(), Some("116.00"));
    }

    #[test]
    fn test_text_needing_escapes_round_trips() {
        let bytes = workbook_bytes(&sample_table(), "Facturas").unwrap();
        let sheet = part_text(&bytes, "xl/worksheets/sheet1.xml");
        let document = roxmltree::Document::parse(&sheet).unwrap();

        let conceptos = document
            .descendants()
            .find(|node| node.attribute("r") == Some("W3"))
            .unwrap();
        let text = conceptos
            .descendants()
            .find(|node| node.has_tag_name((SPREADSHEET_NS, "t")))
            .unwrap();
        assert_eq!(text.text(), Some(r#"Taza "A" & <filtros>"#));
    }

    #[test]
    fn test_column_widths_cover_all_columns() {
        let bytes = workbook_bytes(&sample_table(), "Facturas").unwrap();
        let sheet = part_text(&bytes, "xl/worksheets/sheet1.xml");
        let document = roxmltree::Document::parse(&sheet).unwrap();

        let cols: Vec<_> = document
            .descendants()
            .filter(|node| node.has_tag_name((SPREADSHEET_NS, "col")))
            .collect();
        assert_eq!(cols.len(), COLUMNS.len());
        assert_eq!(cols[0].attribute("width"), Some("15"));
        assert_eq!(cols[21].attribute("width"), Some("70"));
    }

    #[test]
    fn test_sheet_name_lands_in_workbook_part() {
        let bytes = workbook_bytes(&sample_table(), "Reporte 2024").unwrap();
        let workbook = part_text(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Reporte 2024""#));
    }

    #[test]
    fn test_empty_table_still_produces_header() {
        let bytes = workbook_bytes(&InvoiceTable::new(), "Facturas").unwrap();
        let sheet = part_text(&bytes, "xl/worksheets/sheet1.xml");
        let document = roxmltree::Document::parse(&sheet).unwrap();

        let rows: Vec<_> = document
            .descendants()
            .filter(|node| node.has_tag_name((SPREADSHEET_NS, "row")))
            .collect();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_workbook_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facturas.xlsx");

        write_workbook(&path, &sample_table(), "Facturas").unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
