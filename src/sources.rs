use anyhow::Result;

use crate::traits::AdapterRegistry;

/// One line of `web2api sources`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub key: String,
    pub label: String,
    pub url: String,
    pub description: String,
}

pub fn source_rows(adapters: &AdapterRegistry) -> Vec<SourceRow> {
    adapters
        .adapters()
        .iter()
        .map(|a| SourceRow {
            key: a.kind().key().to_string(),
            label: a.kind().label().to_string(),
            url: a.url().to_string(),
            description: a.description().to_string(),
        })
        .collect()
}

pub fn list_sources(adapters: &AdapterRegistry) -> Result<()> {
    println!("{:<14} {:<13} URL", "SOURCE", "LABEL");
    for row in source_rows(adapters) {
        println!("{:<14} {:<13} {}", row.key, row.label, row.url);
        println!("{:<14} {:<13} {}", "", "", row.description);
    }
    Ok(())
}
