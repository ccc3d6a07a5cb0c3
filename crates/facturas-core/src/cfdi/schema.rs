//! Per-element CFDI schema
//!
//! Each XML element the extractor touches has an explicit record whose
//! attributes are resolved once as optional values. Defaulting happens later,
//! in the mapping step, so every default lives in exactly one place.

use roxmltree::Node;

use super::ns;

/// First direct child element with the given namespace and local name.
fn child<'a, 'input>(
    parent: Node<'a, 'input>,
    ns_uri: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    parent
        .children()
        .find(|node| node.has_tag_name((ns_uri, name)))
}

/// Attributes of the root `cfdi:Comprobante` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comprobante<'a> {
    pub serie: Option<&'a str>,
    pub folio: Option<&'a str>,
    pub fecha: Option<&'a str>,
    pub tipo_de_comprobante: Option<&'a str>,
    pub forma_pago: Option<&'a str>,
    pub metodo_pago: Option<&'a str>,
    pub sub_total: Option<&'a str>,
    pub descuento: Option<&'a str>,
    pub total: Option<&'a str>,
    pub moneda: Option<&'a str>,
    pub tipo_cambio: Option<&'a str>,
}

impl<'a> Comprobante<'a> {
    /// Read every tracked attribute from the root element.
    pub fn read(root: Node<'a, '_>) -> Self {
        Self {
            serie: root.attribute("Serie"),
            folio: root.attribute("Folio"),
            fecha: root.attribute("Fecha"),
            tipo_de_comprobante: root.attribute("TipoDeComprobante"),
            forma_pago: root.attribute("FormaPago"),
            metodo_pago: root.attribute("MetodoPago"),
            sub_total: root.attribute("SubTotal"),
            descuento: root.attribute("Descuento"),
            total: root.attribute("Total"),
            moneda: root.attribute("Moneda"),
            tipo_cambio: root.attribute("TipoCambio"),
        }
    }
}

/// Attributes of the optional `cfdi:Emisor` child
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emisor<'a> {
    pub rfc: Option<&'a str>,
    pub nombre: Option<&'a str>,
    pub regimen_fiscal: Option<&'a str>,
}

impl<'a> Emisor<'a> {
    /// Locate and read the issuer element, if present.
    pub fn find(root: Node<'a, '_>) -> Option<Self> {
        child(root, ns::CFDI, "Emisor").map(Self::read)
    }

    fn read(node: Node<'a, '_>) -> Self {
        Self {
            rfc: node.attribute("Rfc"),
            nombre: node.attribute("Nombre"),
            regimen_fiscal: node.attribute("RegimenFiscal"),
        }
    }
}

/// Attributes of the optional `cfdi:Receptor` child
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Receptor<'a> {
    pub rfc: Option<&'a str>,
    pub nombre: Option<&'a str>,
    pub uso_cfdi: Option<&'a str>,
    pub regimen_fiscal_receptor: Option<&'a str>,
    pub domicilio_fiscal_receptor: Option<&'a str>,
}

impl<'a> Receptor<'a> {
    /// Locate and read the receiver element, if present.
    pub fn find(root: Node<'a, '_>) -> Option<Self> {
        child(root, ns::CFDI, "Receptor").map(Self::read)
    }

    fn read(node: Node<'a, '_>) -> Self {
        Self {
            rfc: node.attribute("Rfc"),
            nombre: node.attribute("Nombre"),
            uso_cfdi: node.attribute("UsoCFDI"),
            regimen_fiscal_receptor: node.attribute("RegimenFiscalReceptor"),
            domicilio_fiscal_receptor: node.attribute("DomicilioFiscalReceptor"),
        }
    }
}

/// Attributes of the `tfd:TimbreFiscalDigital` stamp
///
/// The stamp sits two levels down: `cfdi:Complemento` holds the
/// `tfd:TimbreFiscalDigital` element in the second namespace. Either level
/// may be missing on unstamped documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimbreFiscalDigital<'a> {
    pub uuid: Option<&'a str>,
    pub fecha_timbrado: Option<&'a str>,
    pub sello_cfd: Option<&'a str>,
}

impl<'a> TimbreFiscalDigital<'a> {
    /// Locate and read the stamp, if the document carries one.
    pub fn find(root: Node<'a, '_>) -> Option<Self> {
        let complemento = child(root, ns::CFDI, "Complemento")?;
        let timbre = child(complemento, ns::TFD, "TimbreFiscalDigital")?;
        Some(Self::read(timbre))
    }

    fn read(node: Node<'a, '_>) -> Self {
        Self {
            uuid: node.attribute("UUID"),
            fecha_timbrado: node.attribute("FechaTimbrado"),
            sello_cfd: node.attribute("SelloCFD"),
        }
    }
}

/// Attributes of the optional top-level `cfdi:Impuestos` summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Impuestos<'a> {
    pub total_impuestos_trasladados: Option<&'a str>,
}

impl<'a> Impuestos<'a> {
    /// Locate and read the tax summary, if present.
    pub fn find(root: Node<'a, '_>) -> Option<Self> {
        child(root, ns::CFDI, "Impuestos").map(Self::read)
    }

    fn read(node: Node<'a, '_>) -> Self {
        Self {
            total_impuestos_trasladados: node.attribute("TotalImpuestosTrasladados"),
        }
    }
}

/// Attributes of one `cfdi:Concepto` line item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Concepto<'a> {
    pub descripcion: Option<&'a str>,
}

impl<'a> Concepto<'a> {
    /// Read every line item under the optional `cfdi:Conceptos` list,
    /// in document order.
    pub fn read_all(root: Node<'a, '_>) -> Vec<Self> {
        child(root, ns::CFDI, "Conceptos")
            .map(|list| {
                list.children()
                    .filter(|node| node.has_tag_name((ns::CFDI, "Concepto")))
                    .map(Self::read)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn read(node: Node<'a, '_>) -> Self {
        Self {
            descripcion: node.attribute("Descripcion"),
        }
    }
}
