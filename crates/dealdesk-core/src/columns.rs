use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::deals::Column;
use crate::ConfigError;

/// One configured board column: the status id deals are matched on and the
/// display name shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub id: String,
    pub name: String,
}

impl ColumnConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ColumnsFile {
    pub columns: Vec<ColumnConfig>,
}

/// A validated, ordered column configuration.
///
/// Column ids are unique, so each status maps to at most one column.
#[derive(Debug, Clone)]
pub struct BoardLayout {
    columns: Vec<ColumnConfig>,
    index: HashMap<String, usize>,
}

impl BoardLayout {
    /// Validate `columns` and build the status index.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty id or name, or for a
    /// duplicate id.
    pub fn new(columns: Vec<ColumnConfig>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(columns.len());

        for (position, column) in columns.iter().enumerate() {
            if column.id.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "column at position {position} has an empty id"
                )));
            }
            if column.name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "column '{}' has an empty name",
                    column.id
                )));
            }
            if index.insert(column.id.clone(), position).is_some() {
                return Err(ConfigError::Validation(format!(
                    "duplicate column id: '{}'",
                    column.id
                )));
            }
        }

        Ok(Self { columns, index })
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnConfig] {
        &self.columns
    }

    /// Position of the column whose id equals `status`.
    #[must_use]
    pub fn position(&self, status: &str) -> Option<usize> {
        self.index.get(status).copied()
    }

    /// Fresh columns in configuration order, each with no items.
    #[must_use]
    pub fn empty_board(&self) -> Vec<Column> {
        self.columns
            .iter()
            .map(|c| Column {
                id: c.id.clone(),
                name: c.name.clone(),
                items: Vec::new(),
            })
            .collect()
    }
}

/// Load and validate the board columns from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_columns(path: &Path) -> Result<BoardLayout, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ColumnsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: ColumnsFile = serde_yaml::from_str(&content)?;
    BoardLayout::new(file.columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> BoardLayout {
        BoardLayout::new(vec![
            ColumnConfig::new("new", "New"),
            ColumnConfig::new("won", "Won"),
        ])
        .unwrap()
    }

    #[test]
    fn position_follows_configuration_order() {
        let layout = layout();
        assert_eq!(layout.position("new"), Some(0));
        assert_eq!(layout.position("won"), Some(1));
        assert_eq!(layout.position("lost"), None);
    }

    #[test]
    fn empty_board_copies_columns_without_items() {
        let board = layout().empty_board();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].id, "new");
        assert_eq!(board[1].name, "Won");
        assert!(board.iter().all(|c| c.items.is_empty()));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = BoardLayout::new(vec![
            ColumnConfig::new("new", "New"),
            ColumnConfig::new("new", "Fresh"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate column id")),
            "got: {err:?}"
        );
    }

    #[test]
    fn rejects_blank_id_and_name() {
        assert!(BoardLayout::new(vec![ColumnConfig::new(" ", "New")]).is_err());
        assert!(BoardLayout::new(vec![ColumnConfig::new("new", "")]).is_err());
    }

    #[test]
    fn empty_configuration_is_allowed() {
        let layout = BoardLayout::new(Vec::new()).unwrap();
        assert!(layout.columns().is_empty());
    }

    #[test]
    fn parses_columns_yaml() {
        let yaml = "columns:\n  - id: todo\n    name: Todo\n  - id: done\n    name: Done\n";
        let file: ColumnsFile = serde_yaml::from_str(yaml).unwrap();
        let layout = BoardLayout::new(file.columns).unwrap();
        assert_eq!(layout.columns()[1], ColumnConfig::new("done", "Done"));
    }

    #[test]
    fn load_columns_reports_missing_file() {
        let err = load_columns(Path::new("/definitely/not/here/columns.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ColumnsFileIo { .. }));
    }
}
