//! Schema normalization
//!
//! Turns joined raw rows into the [`NormalizedTable`] handed to consumers:
//! the ticket date is reformatted, raw identifiers are renamed to business
//! headers, transport columns are dropped, numeric columns are coerced, and
//! the canonical column order is imposed with passthrough columns last.

use chrono::NaiveDate;
use serde_json::Value;
use shared::{CANONICAL_COLUMNS, CellValue, NormalizedTable, RawRow, is_numeric_header};
use std::collections::{HashMap, HashSet};

/// Raw ticket date field, compact `YYYYMMDD`
pub const DATE_FIELD: &str = "data_edc";

/// Display format of the ticket date
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Raw identifier -> display header
pub const RENAMES: [(&str, &str); 29] = [
    ("Doc_Aplicacao", "ID.apl"),
    ("Parceiro", "Cod. Parceiro"),
    ("Parceiro_T", "Razão Social"),
    ("Instr_EDC", "Instr. EDC"),
    ("Num_Pesagem", "Romaneio"),
    ("data_edc", "Data do edc"),
    ("NomeLocal_Evento", "Unidade"),
    ("NFe", "Nota Produtor"),
    ("nfenum", "Nota SAP"),
    ("TextoTransgenia_Descarga", "Transgenia"),
    ("Peso_Bruto_Descarga", "Peso Bruto (Kg)"),
    ("Tara_Descarga", "Peso Tara (Kg)"),
    ("Peso_Liquido_Descarga", "Peso liquido (Kg)"),
    ("Qtd_Aplicada", "Qtd Aplicada (Kg)"),
    ("Peso_Total", "Descontos (Kg)"),
    ("Umidade_Descarga", "% Umidade"),
    ("Peso_umidade", "Desconto Umidade (Kg)"),
    ("Impurezas_Descarga", "% Impurezas"),
    ("Peso_Impurezas", "Desconto Impureza (Kg)"),
    ("Ardidos_Descarga", "% Ardido"),
    ("Peso_Ardidos", "Desconto Ardidos (Kg)"),
    ("Avariados_Descarga", "% Avariados"),
    ("Peso_Avariados", "Desconto Avariados (Kg)"),
    ("Esverdeados_Descarga", "% Esverdeados"),
    ("Peso_Esverdeados", "Desconto Esverdeados (Kg)"),
    ("Quebrados_Descarga", "% Quebrados"),
    ("Peso_Quebrados", "Desconto Quebrados (Kg)"),
    ("Queimados_Descarga", "% Queimados"),
    ("Peso_Queimados", "Desconto Queimados (Kg)"),
];

/// Internal and transport columns never shown to consumers
pub const DROPPED_COLUMNS: [&str; 6] = [
    "docnum",
    "itmnum",
    "Aplicacao",
    "nftype",
    "pstdat",
    "Tipo_Contrato",
];

/// Display header of a raw identifier
pub fn display_name(raw: &str) -> &str {
    RENAMES
        .iter()
        .find(|(from, _)| *from == raw)
        .map_or(raw, |&(_, to)| to)
}

/// Reformat a compact `YYYYMMDD` date to `DD/MM/YYYY`; anything else is null
pub fn reformat_date(value: &Value) -> CellValue {
    let compact = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return CellValue::Null,
    };
    if compact.len() != 8 || !compact.bytes().all(|b| b.is_ascii_digit()) {
        return CellValue::Null;
    }
    match NaiveDate::parse_from_str(&compact, "%Y%m%d") {
        Ok(date) => CellValue::Text(date.format(DISPLAY_DATE_FORMAT).to_string()),
        Err(_) => CellValue::Null,
    }
}

/// Coerce a value to a number; missing, blank and unparsable values become zero
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Normalize joined rows into the consumer table
pub fn normalize(rows: Vec<RawRow>) -> NormalizedTable {
    // Raw columns in first-seen order
    let mut seen = HashSet::new();
    let raw_columns: Vec<String> = rows
        .iter()
        .flat_map(|row| row.keys())
        .filter(|k| seen.insert(k.as_str()))
        .cloned()
        .collect();

    // Display header -> raw source column; the first raw column wins a shared header
    let mut sources: HashMap<&str, &str> = HashMap::new();
    let mut extras: Vec<&str> = Vec::new();
    for raw in &raw_columns {
        let header = display_name(raw);
        if DROPPED_COLUMNS.contains(&header) || sources.contains_key(header) {
            continue;
        }
        sources.insert(header, raw);
        if !CANONICAL_COLUMNS.contains(&header) {
            extras.push(header);
        }
    }

    let columns: Vec<&str> = CANONICAL_COLUMNS.iter().copied().chain(extras).collect();

    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|header| {
                    let raw = sources.get(header).copied();
                    let value = raw.and_then(|r| row.get(r));
                    if is_numeric_header(header) {
                        CellValue::Number(coerce_number(value))
                    } else if raw == Some(DATE_FIELD) {
                        value.map_or(CellValue::Null, reformat_date)
                    } else {
                        value.cloned().map_or(CellValue::Null, CellValue::from)
                    }
                })
                .collect()
        })
        .collect();

    tracing::debug!(
        rows = rows.len(),
        columns = columns.len(),
        passthrough = columns.len() - CANONICAL_COLUMNS.len(),
        "Normalized rows"
    );

    NormalizedTable::new(columns.into_iter().map(String::from).collect(), cells)
}
