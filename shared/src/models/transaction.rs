//! Transaction Model
//!
//! One row per weighing ticket (romaneio), optionally enriched with the ERP
//! invoice that settled it. Column headers are the business-facing names the
//! dashboard and the report exports display.

use crate::row::CellValue;
use serde::{Deserialize, Serialize};

/// Canonical columns of the transaction table, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ApplicationId,
    PartnerCode,
    PartnerName,
    Contract,
    Instruction,
    Ticket,
    EventDate,
    MaterialCode,
    MaterialName,
    CropName,
    Unit,
    Plate,
    ProducerInvoice,
    ErpInvoice,
    Transgenic,
    GrossWeight,
    TareWeight,
    NetWeight,
    AppliedQuantity,
    TotalDiscount,
    MoisturePct,
    MoistureDiscount,
    ImpurityPct,
    ImpurityDiscount,
    FermentedPct,
    FermentedDiscount,
    DamagedPct,
    DamagedDiscount,
    GreenishPct,
    GreenishDiscount,
    BrokenPct,
    BrokenDiscount,
    BurntPct,
    BurntDiscount,
}

impl Column {
    /// Every canonical column, in presentation order
    pub const ALL: [Column; 34] = [
        Column::ApplicationId,
        Column::PartnerCode,
        Column::PartnerName,
        Column::Contract,
        Column::Instruction,
        Column::Ticket,
        Column::EventDate,
        Column::MaterialCode,
        Column::MaterialName,
        Column::CropName,
        Column::Unit,
        Column::Plate,
        Column::ProducerInvoice,
        Column::ErpInvoice,
        Column::Transgenic,
        Column::GrossWeight,
        Column::TareWeight,
        Column::NetWeight,
        Column::AppliedQuantity,
        Column::TotalDiscount,
        Column::MoisturePct,
        Column::MoistureDiscount,
        Column::ImpurityPct,
        Column::ImpurityDiscount,
        Column::FermentedPct,
        Column::FermentedDiscount,
        Column::DamagedPct,
        Column::DamagedDiscount,
        Column::GreenishPct,
        Column::GreenishDiscount,
        Column::BrokenPct,
        Column::BrokenDiscount,
        Column::BurntPct,
        Column::BurntDiscount,
    ];

    /// Display header of the column
    pub const fn header(self) -> &'static str {
        match self {
            Column::ApplicationId => "ID.apl",
            Column::PartnerCode => "Cod. Parceiro",
            Column::PartnerName => "Razão Social",
            Column::Contract => "contrato",
            Column::Instruction => "Instr. EDC",
            Column::Ticket => "Romaneio",
            Column::EventDate => "Data do edc",
            Column::MaterialCode => "Material",
            Column::MaterialName => "NomeMaterial",
            Column::CropName => "NomeSafra",
            Column::Unit => "Unidade",
            Column::Plate => "Placa",
            Column::ProducerInvoice => "Nota Produtor",
            Column::ErpInvoice => "Nota SAP",
            Column::Transgenic => "Transgenia",
            Column::GrossWeight => "Peso Bruto (Kg)",
            Column::TareWeight => "Peso Tara (Kg)",
            Column::NetWeight => "Peso liquido (Kg)",
            Column::AppliedQuantity => "Qtd Aplicada (Kg)",
            Column::TotalDiscount => "Descontos (Kg)",
            Column::MoisturePct => "% Umidade",
            Column::MoistureDiscount => "Desconto Umidade (Kg)",
            Column::ImpurityPct => "% Impurezas",
            Column::ImpurityDiscount => "Desconto Impureza (Kg)",
            Column::FermentedPct => "% Ardido",
            Column::FermentedDiscount => "Desconto Ardidos (Kg)",
            Column::DamagedPct => "% Avariados",
            Column::DamagedDiscount => "Desconto Avariados (Kg)",
            Column::GreenishPct => "% Esverdeados",
            Column::GreenishDiscount => "Desconto Esverdeados (Kg)",
            Column::BrokenPct => "% Quebrados",
            Column::BrokenDiscount => "Desconto Quebrados (Kg)",
            Column::BurntPct => "% Queimados",
            Column::BurntDiscount => "Desconto Queimados (Kg)",
        }
    }

    /// Look a column up by its display header
    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.header() == header)
    }

    pub fn is_numeric(self) -> bool {
        is_numeric_header(self.header())
    }
}

/// Canonical headers, in presentation order
pub const CANONICAL_COLUMNS: [&str; 34] = {
    let mut headers = [""; 34];
    let mut i = 0;
    while i < Column::ALL.len() {
        headers[i] = Column::ALL[i].header();
        i += 1;
    }
    headers
};

/// Whether a column with this header holds numbers.
///
/// Weights carry a `(Kg)` unit marker, quality rates a `%` marker; the ticket
/// number is the one numeric column without a marker.
pub fn is_numeric_header(header: &str) -> bool {
    header.contains("(Kg)") || header.contains('%') || header == Column::Ticket.header()
}

/// Summed weights over the rows of a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightTotals {
    pub gross: f64,
    pub tare: f64,
    pub net: f64,
    pub applied: f64,
    pub discounts: f64,
}

/// Normalized transaction table
///
/// Columns are the canonical headers followed by any unrecognized passthrough
/// columns; every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl NormalizedTable {
    /// Build a table from column headers and row cells.
    ///
    /// Rows shorter than the header list are padded with nulls, longer rows
    /// are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Table with the canonical columns and no rows
    pub fn empty() -> Self {
        Self {
            columns: CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == header)
    }

    /// Cell at `row` in the column named `header`
    pub fn cell(&self, row: usize, header: &str) -> Option<&CellValue> {
        let idx = self.column_index(header)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of one column, top to bottom
    pub fn column_values(&self, header: &str) -> Vec<&CellValue> {
        match self.column_index(header) {
            Some(idx) => self.rows.iter().map(|r| &r[idx]).collect(),
            None => Vec::new(),
        }
    }

    /// Sum of a numeric column; non-numeric cells count as zero
    pub fn sum(&self, column: Column) -> f64 {
        self.column_values(column.header())
            .into_iter()
            .filter_map(CellValue::as_f64)
            .sum()
    }

    pub fn totals(&self) -> WeightTotals {
        WeightTotals {
            gross: self.sum(Column::GrossWeight),
            tare: self.sum(Column::TareWeight),
            net: self.sum(Column::NetWeight),
            applied: self.sum(Column::AppliedQuantity),
            discounts: self.sum(Column::TotalDiscount),
        }
    }

    /// Rows as header -> value records, in column order
    pub fn to_records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(header, cell)| (header.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }
}
