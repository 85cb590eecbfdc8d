//! ERP entity sets and the queries issued against them

use erp_client::{Filter, ODataQuery};
use shared::DateRange;

/// Weighing tickets (romaneios)
pub const TICKET_ENTITY_SET: &str = "ZC_ACM_LISTA_ROMANEIO_Q001";

/// Incoming invoices
pub const INVOICE_ENTITY_SET: &str = "ZC_FI_ENTRADAFATURA_Q001";

/// Ticket field holding the application document number
pub const TICKET_KEY_FIELD: &str = "Doc_Aplicacao";

/// Invoice field holding the application document number
pub const INVOICE_KEY_FIELD: &str = "Aplicacao";

pub const TICKET_DATE_FIELD: &str = "data_edc";
pub const TICKET_PARTNER_FIELD: &str = "Parceiro";
pub const INVOICE_DATE_FIELD: &str = "pstdat";
pub const INVOICE_PARTNER_FIELD: &str = "parid";

/// Instruction codes of receipt events
pub const INSTRUCTION_CODES: [&str; 3] = ["07", "03", "35"];

/// Contract types; the empty code covers tickets without a contract
pub const CONTRACT_TYPES: [&str; 3] = ["AC3P", "ZFIX", ""];

/// Invoice document type of producer entries
pub const INVOICE_DOC_TYPE: &str = "YI";

/// Width of ERP partner numbers
pub const PARTNER_WIDTH: usize = 10;

pub const TICKET_FIELDS: [&str; 34] = [
    "Parceiro",
    "Parceiro_T",
    "Instr_EDC",
    "contrato",
    "Num_Pesagem",
    "data_edc",
    "Material",
    "NomeMaterial",
    "NomeSafra",
    "NomeLocal_Evento",
    "Placa",
    "NFe",
    "TextoTransgenia_Descarga",
    "Peso_Bruto_Descarga",
    "Tara_Descarga",
    "Peso_Liquido_Descarga",
    "Qtd_Aplicada",
    "Peso_Total",
    "Umidade_Descarga",
    "Peso_umidade",
    "Impurezas_Descarga",
    "Peso_Impurezas",
    "Ardidos_Descarga",
    "Peso_Ardidos",
    "Avariados_Descarga",
    "Peso_Avariados",
    "Esverdeados_Descarga",
    "Peso_Esverdeados",
    "Quebrados_Descarga",
    "Peso_Quebrados",
    "Queimados_Descarga",
    "Peso_Queimados",
    "Doc_Aplicacao",
    "Tipo_Contrato",
];

pub const INVOICE_FIELDS: [&str; 4] = ["Aplicacao", "nfenum", "pstdat", "nftype"];

/// Zero-pad a numeric partner number to the ERP width.
///
/// Alphanumeric identifiers are used as given (trimmed).
pub fn pad_partner(partner: &str) -> String {
    let partner = partner.trim();
    if !partner.is_empty() && partner.chars().all(|c| c.is_ascii_digit()) {
        format!("{:0>width$}", partner, width = PARTNER_WIDTH)
    } else {
        partner.to_string()
    }
}

/// Ticket query for a date range, optionally restricted to one partner
pub fn ticket_query(range: &DateRange, partner: Option<&str>) -> ODataQuery {
    let mut filter = Filter::all([
        Filter::any_of("Instr_EDC", INSTRUCTION_CODES),
        Filter::any_of("Tipo_Contrato", CONTRACT_TYPES),
        Filter::between(TICKET_DATE_FIELD, &range.compact_start(), &range.compact_end()),
    ]);
    if let Some(partner) = partner {
        filter = filter.and(Filter::eq(TICKET_PARTNER_FIELD, &pad_partner(partner)));
    }
    ODataQuery::new().filter(filter).select(TICKET_FIELDS)
}

/// Invoice query for a date range, optionally restricted to one partner
pub fn invoice_query(range: &DateRange, partner: Option<&str>) -> ODataQuery {
    let mut filter = Filter::all([
        Filter::between(INVOICE_DATE_FIELD, &range.compact_start(), &range.compact_end()),
        Filter::eq("nftype", INVOICE_DOC_TYPE),
    ]);
    if let Some(partner) = partner {
        filter = filter.and(Filter::eq(INVOICE_PARTNER_FIELD, &pad_partner(partner)));
    }
    ODataQuery::new().filter(filter).select(INVOICE_FIELDS)
}
