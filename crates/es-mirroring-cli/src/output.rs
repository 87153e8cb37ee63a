use clap::ValueEnum;
use comfy_table::{Cell, Table};
use serde::Serialize;

use es_mirroring::MirroringConfigState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputType {
    #[default]
    Table,
    Json,
}

pub fn render_state(state: &MirroringConfigState, output: OutputType) -> anyhow::Result<String> {
    match output {
        OutputType::Json => to_json(state),
        OutputType::Table => Ok(state_table(state).to_string()),
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn state_table(state: &MirroringConfigState) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_header(vec!["#", "TOPIC PATTERN"]);
    for (index, pattern) in state.mirroring_topic_patterns.iter().enumerate() {
        table.add_row(vec![Cell::new(index), Cell::new(pattern)]);
    }
    table
}
