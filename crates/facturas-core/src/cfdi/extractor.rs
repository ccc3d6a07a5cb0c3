//! Field extraction from parsed CFDI documents

use std::str::FromStr;

use roxmltree::Document;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::record::{InvoiceRecord, NOT_AVAILABLE};

use super::rules::{build_verification_url, is_well_formed_rfc, scan_descriptions};
use super::schema::{Comprobante, Concepto, Emisor, Impuestos, Receptor, TimbreFiscalDigital};
use super::{Result, ns};

/// Result of extracting one document
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The flat invoice record
    pub record: InvoiceRecord,

    /// Advisory findings that do not affect the record
    pub warnings: Vec<String>,
}

/// Field extractor for CFDI 4.0 documents
///
/// Stateless; one instance can extract any number of documents. Extraction
/// is deterministic: the same document always yields the same record.
pub struct CfdiExtractor;

impl CfdiExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Map one parsed document to a flat invoice record.
    ///
    /// Fails when the root element is not a CFDI 4.0 `Comprobante`, or when
    /// a monetary attribute cannot be read as a decimal number. Everything
    /// else degrades to the documented defaults, with a warning where the
    /// absence is worth an operator's attention.
    pub fn extract(&self, document: &Document) -> Result<Extraction> {
        let root = document.root_element();
        if !root.has_tag_name((ns::CFDI, "Comprobante")) {
            let name = root.tag_name();
            let label = match name.namespace() {
                Some(uri) => format!("{{{}}}{}", uri, name.name()),
                None => name.name().to_string(),
            };
            return Err(ExtractionError::UnexpectedRoot(label));
        }

        let comprobante = Comprobante::read(root);
        let emisor = Emisor::find(root);
        let receptor = Receptor::find(root);
        let timbre = TimbreFiscalDigital::find(root);
        let impuestos = Impuestos::find(root);
        let conceptos = Concepto::read_all(root);

        let mut warnings = Vec::new();
        if emisor.is_none() {
            warnings.push("document has no cfdi:Emisor element".to_string());
        }
        if receptor.is_none() {
            warnings.push("document has no cfdi:Receptor element".to_string());
        }
        if timbre.is_none() {
            warnings.push("document is not stamped (no tfd:TimbreFiscalDigital)".to_string());
        }

        let emisor = emisor.unwrap_or_default();
        let receptor = receptor.unwrap_or_default();
        let timbre = timbre.unwrap_or_default();
        let impuestos = impuestos.unwrap_or_default();

        // The verification link takes the total verbatim, before coercion.
        let total_raw = comprobante.total.unwrap_or("0");
        let emisor_rfc = text_or_na(emisor.rfc);
        let receptor_rfc = text_or_na(receptor.rfc);
        let uuid = text_or_na(timbre.uuid);
        let sello = timbre.sello_cfd.unwrap_or("");

        check_rfc("issuer", &emisor_rfc, &mut warnings);
        check_rfc("receiver", &receptor_rfc, &mut warnings);

        let url_verificacion =
            build_verification_url(&uuid, &emisor_rfc, &receptor_rfc, total_raw, sello);

        let descripciones: Vec<&str> = conceptos
            .iter()
            .map(|concepto| concepto.descripcion.unwrap_or(""))
            .collect();
        let flags = scan_descriptions(&descripciones);
        let conceptos_text = if descripciones.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            descripciones.join(", ")
        };

        let record = InvoiceRecord {
            serie: text_or_na(comprobante.serie),
            folio: text_or_na(comprobante.folio),
            fecha: text_or_na(comprobante.fecha),
            tipo_comprobante: text_or_na(comprobante.tipo_de_comprobante),
            forma_pago: text_or_na(comprobante.forma_pago),
            metodo_pago: text_or_na(comprobante.metodo_pago),
            sub_total: parse_amount("SubTotal", comprobante.sub_total.unwrap_or("0"))?,
            descuento: parse_amount("Descuento", comprobante.descuento.unwrap_or("0"))?,
            total: parse_amount("Total", total_raw)?,
            moneda: text_or_na(comprobante.moneda),
            tipo_cambio: comprobante.tipo_cambio.unwrap_or("1").to_string(),
            emisor_rfc,
            emisor_nombre: text_or_na(emisor.nombre),
            emisor_regimen: text_or_na(emisor.regimen_fiscal),
            receptor_rfc,
            receptor_nombre: text_or_na(receptor.nombre),
            receptor_uso_cfdi: text_or_na(receptor.uso_cfdi),
            receptor_regimen: text_or_na(receptor.regimen_fiscal_receptor),
            receptor_cp: text_or_na(receptor.domicilio_fiscal_receptor),
            uuid,
            fecha_timbrado: text_or_na(timbre.fecha_timbrado),
            url_verificacion,
            conceptos: conceptos_text,
            impuestos_trasladados: parse_amount(
                "TotalImpuestosTrasladados",
                impuestos.total_impuestos_trasladados.unwrap_or("0"),
            )?,
            contiene_cafe: flags.coffee,
            contiene_cerveza: flags.beer,
        };

        debug!(
            "extracted folio {} ({} line items, {} warnings)",
            record.folio,
            descripciones.len(),
            warnings.len()
        );

        Ok(Extraction { record, warnings })
    }
}

impl Default for CfdiExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn text_or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

/// Read a monetary attribute; failure here is a document-level error.
fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| ExtractionError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Advisory RFC shape check; mismatches become warnings, never errors.
fn check_rfc(role: &str, rfc: &str, warnings: &mut Vec<String>) {
    if rfc != NOT_AVAILABLE && !is_well_formed_rfc(rfc) {
        warnings.push(format!(
            "{} RFC '{}' does not match the SAT pattern",
            role, rfc
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfdi;
    use pretty_assertions::assert_eq;

    const STAMPED_INVOICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4"
    Version="4.0" Serie="A" Folio="123" Fecha="2024-01-15T10:30:00"
    TipoDeComprobante="I" FormaPago="01" MetodoPago="PUE"
    SubTotal="100.00" Descuento="0.00" Total="116.00" Moneda="MXN" TipoCambio="1">
  <cfdi:Emisor Rfc="AAA010101AAA" Nombre="Emisor SA" RegimenFiscal="601"/>
  <cfdi:Receptor Rfc="XAXX010101000" Nombre="Publico General" UsoCFDI="G03"
      RegimenFiscalReceptor="616" DomicilioFiscalReceptor="06000"/>
  <cfdi:Conceptos>
    <cfdi:Concepto Descripcion="Café de grano" Importe="100.00"/>
  </cfdi:Conceptos>
  <cfdi:Impuestos TotalImpuestosTrasladados="16.00"/>
  <cfdi:Complemento>
    <tfd:TimbreFiscalDigital xmlns:tfd="http://www.sat.gob.mx/TimbreFiscalDigital"
        UUID="AD662D33-6934-459C-A128-BDF0393F0F44"
        FechaTimbrado="2024-01-15T10:31:02"
        SelloCFD="abcdefghijklmnopqrstuvwxyz0123456789"/>
  </cfdi:Complemento>
</cfdi:Comprobante>"#;

    const BARE_INVOICE: &str = r#"<cfdi:Comprobante
        xmlns:cfdi="http://www.sat.gob.mx/cfd/4" Version="4.0"/>"#;

    fn extract(xml: &str) -> Extraction {
        let document = cfdi::parse(xml).unwrap();
        CfdiExtractor::new().extract(&document).unwrap()
    }

    #[test]
    fn test_present_attributes_are_verbatim() {
        let extraction = extract(STAMPED_INVOICE);
        let record = &extraction.record;

        assert_eq!(record.serie, "A");
        assert_eq!(record.folio, "123");
        assert_eq!(record.fecha, "2024-01-15T10:30:00");
        assert_eq!(record.tipo_comprobante, "I");
        assert_eq!(record.sub_total, Decimal::from_str("100.00").unwrap());
        assert_eq!(record.total, Decimal::from_str("116.00").unwrap());
        assert_eq!(record.emisor_nombre, "Emisor SA");
        assert_eq!(record.receptor_cp, "06000");
        assert_eq!(record.uuid, "AD662D33-6934-459C-A128-BDF0393F0F44");
        assert_eq!(record.fecha_timbrado, "2024-01-15T10:31:02");
        assert_eq!(
            record.impuestos_trasladados,
            Decimal::from_str("16.00").unwrap()
        );
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn test_verification_link_is_derived() {
        let record = extract(STAMPED_INVOICE).record;
        assert_eq!(
            record.url_verificacion,
            "https://verificacfdi.facturaelectronica.sat.gob.mx/default.aspx?\
             id=AD662D33-6934-459C-A128-BDF0393F0F44\
             &re=AAA010101AAA&rr=XAXX010101000\
             &tt=000000116.000000&fe=23456789"
        );
    }

    #[test]
    fn test_keyword_flags_from_line_items() {
        let record = extract(STAMPED_INVOICE).record;
        assert_eq!(record.conceptos, "Café de grano");
        assert!(record.contiene_cafe);
        assert!(!record.contiene_cerveza);
    }

    #[test]
    fn test_missing_data_takes_documented_defaults() {
        let extraction = extract(BARE_INVOICE);
        let record = &extraction.record;

        assert_eq!(record.serie, "N/A");
        assert_eq!(record.moneda, "N/A");
        assert_eq!(record.tipo_cambio, "1");
        assert_eq!(record.sub_total, Decimal::ZERO);
        assert_eq!(record.descuento, Decimal::ZERO);
        assert_eq!(record.total, Decimal::ZERO);
        assert_eq!(record.impuestos_trasladados, Decimal::ZERO);
        assert_eq!(record.emisor_rfc, "N/A");
        assert_eq!(record.receptor_nombre, "N/A");
        assert_eq!(record.uuid, "N/A");
        assert_eq!(record.url_verificacion, "N/A");
        assert_eq!(record.conceptos, "N/A");
        assert!(!record.contiene_cafe);
        assert!(!record.contiene_cerveza);

        assert_eq!(extraction.warnings.len(), 3);
    }

    #[test]
    fn test_items_without_description_still_join() {
        let xml = r#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4">
          <cfdi:Conceptos>
            <cfdi:Concepto Importe="10"/>
            <cfdi:Concepto Importe="20"/>
          </cfdi:Conceptos>
        </cfdi:Comprobante>"#;
        let record = extract(xml).record;
        assert_eq!(record.conceptos, ", ");
    }

    #[test]
    fn test_stamp_without_sello_disables_link() {
        let xml = r#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4" Total="10">
          <cfdi:Complemento>
            <tfd:TimbreFiscalDigital
                xmlns:tfd="http://www.sat.gob.mx/TimbreFiscalDigital"
                UUID="AD662D33-6934-459C-A128-BDF0393F0F44"/>
          </cfdi:Complemento>
        </cfdi:Comprobante>"#;
        let record = extract(xml).record;
        assert_eq!(record.uuid, "AD662D33-6934-459C-A128-BDF0393F0F44");
        assert_eq!(record.url_verificacion, "N/A");
    }

    #[test]
    fn test_unexpected_root_is_an_error() {
        let document = cfdi::parse("<factura Total=\"10\"/>").unwrap();
        let error = CfdiExtractor::new().extract(&document).unwrap_err();
        assert!(matches!(error, ExtractionError::UnexpectedRoot(name) if name == "factura"));
    }

    #[test]
    fn test_older_schema_namespace_is_rejected() {
        let xml = r#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/3"/>"#;
        let document = cfdi::parse(xml).unwrap();
        let error = CfdiExtractor::new().extract(&document).unwrap_err();
        assert!(matches!(
            error,
            ExtractionError::UnexpectedRoot(name)
                if name == "{http://www.sat.gob.mx/cfd/3}Comprobante"
        ));
    }

    #[test]
    fn test_non_numeric_total_is_a_document_error() {
        let xml = r#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4"
            Total="dieciseis"/>"#;
        let document = cfdi::parse(xml).unwrap();
        let error = CfdiExtractor::new().extract(&document).unwrap_err();
        assert!(matches!(
            error,
            ExtractionError::InvalidNumber { field: "Total", .. }
        ));
    }

    #[test]
    fn test_suspect_rfc_raises_a_warning() {
        let xml = r#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4">
          <cfdi:Emisor Rfc="not-an-rfc"/>
        </cfdi:Comprobante>"#;
        let extraction = extract(xml);
        assert_eq!(extraction.record.emisor_rfc, "not-an-rfc");
        assert!(
            extraction
                .warnings
                .iter()
                .any(|warning| warning.contains("issuer RFC"))
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let document = cfdi::parse(STAMPED_INVOICE).unwrap();
        let extractor = CfdiExtractor::new();
        let first = extractor.extract(&document).unwrap();
        let second = extractor.extract(&document).unwrap();
        assert_eq!(first.record, second.record);
    }
}
