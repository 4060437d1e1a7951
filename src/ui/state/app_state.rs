use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::table::DataTable;

pub struct AppState {
    /// Raw table of the current upload; replaced wholesale on every upload.
    pub table: Signal<Option<DataTable>>,
    /// File name shown next to the preview.
    pub source_name: Signal<String>,
    /// Hierarchy column names, outermost first (check order in the UI).
    pub hierarchy: Signal<Vec<String>>,
    /// Selected value column; only ever a numeric column or `None`.
    pub value_column: Signal<Option<String>>,
    pub ingest_error: Signal<Option<String>>,
    pub show_preview: Signal<bool>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            table: use_signal(|| None::<DataTable>),
            source_name: use_signal(String::new),
            hierarchy: use_signal(Vec::<String>::new),
            value_column: use_signal(|| None::<String>),
            ingest_error: use_signal(|| None::<String>),
            show_preview: use_signal(|| false),
            busy: use_signal(|| false),
            status: use_signal(|| "대기 중".to_string()),
        }
    }
}
