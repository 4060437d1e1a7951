use dioxus::prelude::*;
use rfd::FileDialog;

use crate::domain::entities::chart::{TreemapSpec, TreemapTile};
use crate::domain::entities::table::DataTable;
use crate::infra::import::excel::import_excel;
use crate::ui::state::app_state::AppState;
use crate::usecase::aggregate::aggregate;
use crate::usecase::defaults::{default_hierarchy, default_value_column};
use crate::usecase::treemap::build_treemap;

const PREVIEW_ROWS: usize = 5;

const INFO_STYLE: &str = "background: #e8f0fe; color: #1a3f78; padding: 10px 12px; border-radius: 8px;";
const WARNING_STYLE: &str =
    "background: #fff8e1; color: #8a6d1a; padding: 10px 12px; border-radius: 8px;";
const ERROR_STYLE: &str = "background: #fdecea; color: #b00020; padding: 10px 12px; border-radius: 8px;";

#[derive(Clone, Debug, PartialEq)]
struct DropdownOption {
    value: String,
    label: String,
}

fn dropdown_label(options: &[DropdownOption], selected: Option<&str>) -> String {
    selected
        .and_then(|value| options.iter().find(|opt| opt.value == value))
        .map(|opt| opt.label.clone())
        .unwrap_or_else(|| "(선택 안 함)".to_string())
}

#[component]
fn DropdownSelect(
    label: &'static str,
    options: Vec<DropdownOption>,
    selected: Option<String>,
    disabled: bool,
    mut open: Signal<bool>,
    on_select: EventHandler<String>,
) -> Element {
    let is_open = open() && !disabled;
    let selected_label = dropdown_label(&options, selected.as_deref());

    rsx! {
        div {
            style: "position: relative; display: flex; flex-direction: column; gap: 6px;",
            span { "{label}" }
            button {
                style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer; text-align: left;",
                disabled: disabled,
                onclick: move |event| {
                    event.stop_propagation();
                    open.set(!open());
                },
                "{selected_label}"
            }

            if is_open {
                div {
                    style: "position: absolute; top: 100%; left: 0; right: 0; max-height: 320px; overflow-y: auto; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200;",
                    onclick: move |event| event.stop_propagation(),
                    {options.iter().map(|opt| {
                        let value = opt.value.clone();
                        let label = opt.label.clone();
                        let is_selected = selected.as_deref() == Some(value.as_str());
                        let background = if is_selected { "#eef4ff" } else { "transparent" };
                        rsx!(
                            div {
                                style: "padding: 8px 10px; cursor: pointer; background: {background};",
                                onclick: move |_| {
                                    on_select.call(value.clone());
                                    open.set(false);
                                },
                                "{label}"
                            }
                        )
                    })}
                }
            }
        }
    }
}

#[component]
fn HierarchyPicker(
    columns: Vec<String>,
    selected: Vec<String>,
    on_toggle: EventHandler<String>,
) -> Element {
    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 6px;",
            span { "계층 구조를 선택하세요" }
            div {
                style: "border: 1px solid #bbb; border-radius: 8px; background: #fff; max-height: 260px; overflow-y: auto; padding: 4px;",
                {columns.iter().map(|column| {
                    let name = column.clone();
                    let order = selected.iter().position(|c| c == column);
                    let checked = order.is_some();
                    let badge = order.map(|idx| format!("{}", idx + 1)).unwrap_or_default();
                    rsx!(
                        label {
                            style: "display: flex; align-items: center; gap: 8px; padding: 5px 6px; cursor: pointer;",
                            input {
                                r#type: "checkbox",
                                checked: checked,
                                onclick: move |_| {
                                    on_toggle.call(name.clone());
                                }
                            }
                            span { style: "flex: 1;", "{column}" }
                            if checked {
                                span {
                                    style: "min-width: 18px; text-align: center; background: #4a6fb0; color: #fff; border-radius: 9px; font-size: 11px;",
                                    "{badge}"
                                }
                            }
                        }
                    )
                })}
            }
        }
    }
}

fn tile_element(tile: &TreemapTile) -> Element {
    let lines: Vec<String> = tile.text.lines().map(str::to_string).collect();
    // Leaves get the full three-line text when the tile can hold it;
    // branch tiles only carry their header label.
    let show_full_text = tile.is_leaf
        && tile.rect.width >= 70.0
        && tile.rect.height >= 14.0 * lines.len() as f64 + 8.0;
    let show_header = !tile.is_leaf && tile.rect.width >= 40.0 && tile.rect.height >= 20.0;
    let fill_opacity = if tile.is_leaf { "0.85" } else { "0.45" };
    let rect_style = format!(
        "fill: {}; fill-opacity: {fill_opacity}; stroke: #ffffff; stroke-width: 2;",
        tile.color
    );

    rsx! {
        rect {
            x: "{tile.rect.x}",
            y: "{tile.rect.y}",
            width: "{tile.rect.width}",
            height: "{tile.rect.height}",
            style: "{rect_style}",
            title { "{tile.hover}" }
        }
        if show_full_text {
            {lines.iter().enumerate().map(|(idx, line)| {
                let y = tile.rect.y + 16.0 + 14.0 * idx as f64;
                let weight = if idx == 0 { "600" } else { "400" };
                rsx!(
                    text {
                        x: "{tile.rect.x + 6.0}",
                        y: "{y}",
                        style: "font-size: 12px; font-weight: {weight}; fill: #333333; pointer-events: none;",
                        "{line}"
                    }
                )
            })}
        }
        if show_header {
            text {
                x: "{tile.rect.x + 6.0}",
                y: "{tile.rect.y + 15.0}",
                style: "font-size: 12px; font-weight: 600; fill: #333333; pointer-events: none;",
                "{tile.label}"
            }
        }
    }
}

#[component]
fn TreemapChart(spec: TreemapSpec) -> Element {
    rsx! {
        svg {
            style: "width: 100%; height: auto; background: #fff; border-radius: 8px;",
            view_box: "0 0 {spec.width} {spec.height}",
            {spec.tiles.iter().map(tile_element)}
        }
    }
}

#[component]
fn PreviewTable(table: DataTable) -> Element {
    let head = table.head(PREVIEW_ROWS);

    rsx! {
        div {
            style: "overflow-x: auto; border: 1px solid #ddd; border-radius: 8px;",
            table {
                style: "border-collapse: collapse; width: 100%; font-size: 13px;",
                thead {
                    tr {
                        {table.columns.iter().map(|column| rsx!(
                            th {
                                style: "border-bottom: 1px solid #ccc; background: #f7f7f7; padding: 6px 10px; text-align: left; white-space: nowrap;",
                                "{column}"
                            }
                        ))}
                    }
                }
                tbody {
                    {head.iter().map(|row| rsx!(
                        tr {
                            {row.iter().map(|value| rsx!(
                                td {
                                    style: "border-bottom: 1px solid #eee; padding: 5px 10px; white-space: nowrap;",
                                    "{value}"
                                }
                            ))}
                        }
                    ))}
                }
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    let AppState {
        mut table,
        mut source_name,
        mut hierarchy,
        mut value_column,
        mut ingest_error,
        mut show_preview,
        mut busy,
        mut status,
    } = AppState::new();

    let value_dropdown_open = use_signal(|| false);

    let current_table = table();
    let hierarchy_snapshot = hierarchy();
    let value_snapshot = value_column();

    let numeric_options: Vec<DropdownOption> = current_table
        .as_ref()
        .map(|t| {
            t.numeric_columns()
                .into_iter()
                .map(|name| DropdownOption {
                    label: name.clone(),
                    value: name,
                })
                .collect()
        })
        .unwrap_or_default();
    let no_numeric_columns = current_table.is_some() && numeric_options.is_empty();
    let preview_label = if show_preview() {
        "업로드 데이터 확인 ▲"
    } else {
        "업로드 데이터 확인 ▼"
    };

    // Side-panel column settings, only once a table is loaded.
    let column_settings = current_table.as_ref().map(|current| {
        let columns = current.columns.clone();
        let options = numeric_options.clone();
        rsx! {
            hr { style: "width: 100%; border: none; border-top: 1px solid #ddd;" }
            h3 { style: "margin: 0;", "컬럼 설정" }
            HierarchyPicker {
                columns: columns,
                selected: hierarchy_snapshot.clone(),
                on_toggle: move |name: String| {
                    let mut selected = hierarchy();
                    match selected.iter().position(|column| *column == name) {
                        Some(idx) => {
                            selected.remove(idx);
                        }
                        None => selected.push(name),
                    }
                    hierarchy.set(selected);
                },
            }
            DropdownSelect {
                label: "매출액(크기) 기준 컬럼",
                options: options,
                selected: value_snapshot.clone(),
                disabled: no_numeric_columns,
                open: value_dropdown_open,
                on_select: move |value: String| {
                    value_column.set(Some(value));
                },
            }
            if no_numeric_columns {
                p {
                    style: "margin: 0; color: #b00020; font-size: 12px;",
                    "숫자 컬럼이 없어 매출액 기준을 선택할 수 없습니다."
                }
            }
        }
    });

    // Main area below the title: preview controls plus chart or message.
    let main_body = match current_table.as_ref() {
        Some(current) => {
            let preview = show_preview().then(|| {
                rsx! {
                    PreviewTable { table: current.clone() }
                }
            });
            let chart = if no_numeric_columns {
                rsx! {
                    p {
                        style: ERROR_STYLE,
                        "이 파일에는 숫자 컬럼이 없어 차트를 그릴 수 없습니다. 금액 컬럼이 포함된 파일을 업로드해 주세요."
                    }
                }
            } else if hierarchy_snapshot.is_empty() || value_snapshot.is_none() {
                rsx! {
                    p {
                        style: WARNING_STYLE,
                        "분석할 품목명과 매출액 컬럼을 선택해 주세요."
                    }
                }
            } else {
                render_chart(
                    current,
                    &hierarchy_snapshot,
                    value_snapshot.as_deref().unwrap_or_default(),
                )
            };
            rsx! {
                div {
                    button {
                        style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                        onclick: move |_| {
                            show_preview.set(!show_preview());
                        },
                        "{preview_label}"
                    }
                    span { style: "margin-left: 8px; color: #666; font-size: 12px;", "{source_name()}" }
                }
                {preview}
                {chart}
            }
        }
        None => match ingest_error() {
            Some(message) => rsx! {
                p { style: ERROR_STYLE, "{message}" }
            },
            None => rsx! {
                p { style: INFO_STYLE, "왼쪽 사이드바에서 매출 데이터를 업로드해 주세요." }
            },
        },
    };

    rsx! {
        div {
            style: "display: flex; gap: 16px; align-items: flex-start; font-family: sans-serif; padding: 12px;",

            div {
                style: "width: 280px; flex-shrink: 0; display: flex; flex-direction: column; gap: 14px; background: #f3f4f6; border-radius: 10px; padding: 14px;",
                h3 { style: "margin: 0;", "데이터 업로드" }
                button {
                    style: "border: 1px solid #4a6fb0; background: #4a6fb0; color: #fff; padding: 8px 12px; border-radius: 8px; cursor: pointer;",
                    disabled: busy(),
                    onclick: move |_| {
                        if busy() {
                            return;
                        }

                        let Some(file_path) = FileDialog::new()
                            .add_filter("매출 엑셀 파일", &["xlsx", "xls"])
                            .pick_file() else {
                            *status.write() = "업로드 취소됨".to_string();
                            return;
                        };

                        *busy.write() = true;
                        *status.write() = format!("불러오는 중: {}", file_path.display());

                        match import_excel(&file_path) {
                            Ok(imported) => {
                                *hierarchy.write() = default_hierarchy(&imported);
                                *value_column.write() = default_value_column(&imported);
                                *source_name.write() = file_path
                                    .file_name()
                                    .and_then(|name| name.to_str())
                                    .unwrap_or("업로드 파일")
                                    .to_string();
                                *ingest_error.write() = None;
                                *status.write() =
                                    format!("{}개 행을 불러왔습니다", imported.rows.len());
                                *table.write() = Some(imported);
                            }
                            Err(err) => {
                                *table.write() = None;
                                *hierarchy.write() = Vec::new();
                                *value_column.write() = None;
                                *source_name.write() = String::new();
                                *ingest_error.write() =
                                    Some(format!("파일을 읽는 중 오류가 발생했습니다: {err:#}"));
                                *status.write() = "업로드 실패".to_string();
                            }
                        }

                        *busy.write() = false;
                    },
                    "ERP 매출 엑셀 파일 선택 (xlsx / xls)"
                }
                p { style: "margin: 0; color: #666; font-size: 12px;", "{status()}" }
                {column_settings}
            }

            div {
                style: "flex: 1; min-width: 0; display: flex; flex-direction: column; gap: 12px;",
                h1 { style: "margin: 0;", "📊 매출 비중 분석 히트맵" }
                {main_body}
            }
        }
    }
}

/// Aggregate and hand the result to the chart. Runs synchronously on every
/// selection change; failures render inline, never terminate the session.
fn render_chart(table: &DataTable, hierarchy: &[String], value_column: &str) -> Element {
    match aggregate(table, hierarchy, value_column) {
        Ok(aggregated) if aggregated.rows.is_empty() => rsx! {
            p {
                style: INFO_STYLE,
                "양수 매출 데이터가 없어 표시할 항목이 없습니다."
            }
        },
        Ok(aggregated) => {
            let spec = build_treemap(&aggregated);
            rsx! {
                TreemapChart { spec: spec }
            }
        }
        Err(err) => rsx! {
            p {
                style: ERROR_STYLE,
                "차트를 만드는 중 오류가 발생했습니다: {err:#}"
            }
        },
    }
}
