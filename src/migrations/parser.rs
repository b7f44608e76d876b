//! Parser for SQL migration files
//!
//! Migration files are UTF-8 text delimited by `-- migrate:up` and
//! `-- migrate:down` marker lines (case-insensitive, with or without a
//! space after the comment token). A file may contain multiple up/down
//! sections; up sections concatenate in file order, down sections in
//! reverse file order so the last-defined block executes first on
//! rollback.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::migrations::changeset::Changeset;

/// Separator used when joining multiple SQL blocks of the same section
const BLOCK_SEPARATOR: &str = ";\n\n";

/// File extension migration files must carry
const MIGRATION_EXTENSION: &str = "sql";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    Up,
    Down,
}

/// Parser for migration source files and directories
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single migration file
    ///
    /// The changeset id is the file name without its extension.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Changeset> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                Error::invalid_format(format!("Invalid migration filename: {}", path.display()))
            })?
            .to_string();

        self.parse_source(&content, &id, path)
    }

    /// Parse migration content from a string
    ///
    /// Lines before the first marker are discarded. Marker lines are
    /// consumed; each one closes the currently open block and switches
    /// the cursor. Empty blocks are dropped after trimming.
    ///
    /// # Returns
    /// * `Ok(Changeset)` - At least one non-empty up block was found
    /// * `Err(Error::MissingUpSection)` - No up content parsed
    pub fn parse_source(
        &self,
        content: &str,
        id: &str,
        source_path: impl AsRef<Path>,
    ) -> Result<Changeset> {
        fn close_block(
            section: Section,
            buffer: &mut String,
            up: &mut Vec<String>,
            down: &mut Vec<String>,
        ) {
            let block = buffer.trim();
            if !block.is_empty() {
                match section {
                    Section::Up => up.push(block.to_string()),
                    Section::Down => down.push(block.to_string()),
                    Section::None => {}
                }
            }
            buffer.clear();
        }

        let mut up_blocks: Vec<String> = Vec::new();
        let mut down_blocks: Vec<String> = Vec::new();
        let mut buffer = String::new();
        let mut section = Section::None;

        for line in content.lines() {
            let marker = line.trim().to_lowercase();

            if marker.starts_with("-- migrate:up") || marker.starts_with("--migrate:up") {
                close_block(section, &mut buffer, &mut up_blocks, &mut down_blocks);
                section = Section::Up;
                continue;
            }
            if marker.starts_with("-- migrate:down") || marker.starts_with("--migrate:down") {
                close_block(section, &mut buffer, &mut up_blocks, &mut down_blocks);
                section = Section::Down;
                continue;
            }

            if section != Section::None {
                buffer.push_str(line);
                buffer.push('\n');
            }
        }

        // Close out whatever section is still open at end of input
        close_block(section, &mut buffer, &mut up_blocks, &mut down_blocks);

        if up_blocks.is_empty() {
            return Err(Error::MissingUpSection(id.to_string()));
        }

        let up_sql = up_blocks.join(BLOCK_SEPARATOR);
        let down_sql = down_blocks
            .iter()
            .rev()
            .cloned()
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR);

        Ok(Changeset::new(id, up_sql, down_sql, source_path.as_ref()))
    }

    /// Load all changesets from a directory, sorted for execution
    ///
    /// Only `.sql` files are considered; hidden files are skipped. The
    /// filesystem listing order is arbitrary and never relied on: the
    /// result is ordered by the explicit policy below.
    ///
    /// Sort policy: versioned changesets first, ascending by version with
    /// ties broken by id; changesets without a numeric version sort after
    /// all versioned ones, ascending lexically by id.
    ///
    /// # Returns
    /// * `Err(Error::FileNotFound)` - The directory does not exist
    /// * `Err(Error::DuplicateMigration)` - Two files share an id
    pub fn load_directory(&self, dir: impl AsRef<Path>) -> Result<Vec<Changeset>> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(Error::FileNotFound(dir.display().to_string()));
        }

        let mut changesets = Vec::new();
        let mut seen_ids = HashSet::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            let name = entry.file_name();
            let name = name.to_str().ok_or_else(|| {
                Error::invalid_format(format!("Invalid directory entry: {}", path.display()))
            })?;
            if name.starts_with('.') {
                continue;
            }
            let is_migration = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(MIGRATION_EXTENSION))
                .unwrap_or(false);
            if !is_migration {
                continue;
            }

            let changeset = self.parse_file(&path)?;
            if !seen_ids.insert(changeset.id.clone()) {
                return Err(Error::DuplicateMigration(changeset.id));
            }
            changesets.push(changeset);
        }

        changesets.sort_by(compare_changesets);
        Ok(changesets)
    }
}

fn compare_changesets(a: &Changeset, b: &Changeset) -> Ordering {
    match (a.version(), b.version()) {
        (Some(av), Some(bv)) => av.cmp(&bv).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::write;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<Changeset> {
        Parser::new().parse_source(content, "001_test", "/tmp/001_test.sql")
    }

    #[test]
    fn test_single_up_down_pair() {
        let content = "-- migrate:up\n\
                       CREATE TABLE users (id INTEGER PRIMARY KEY);\n\
                       \n\
                       -- migrate:down\n\
                       DROP TABLE users;\n";

        let changeset = parse(content).unwrap();
        assert_eq!(changeset.up_sql, "CREATE TABLE users (id INTEGER PRIMARY KEY);");
        assert_eq!(changeset.down_sql, "DROP TABLE users;");
    }

    #[test]
    fn test_multiple_sections_up_in_order_down_reversed() {
        let content = "-- migrate:up\n\
                       CREATE TABLE users (id INTEGER);\n\
                       -- migrate:down\n\
                       DROP TABLE users;\n\
                       -- migrate:up\n\
                       ALTER TABLE users ADD COLUMN email TEXT;\n\
                       -- migrate:down\n\
                       ALTER TABLE users DROP COLUMN email;\n";

        let changeset = parse(content).unwrap();

        // Up blocks keep file order
        assert_eq!(
            changeset.up_sql,
            "CREATE TABLE users (id INTEGER);;\n\nALTER TABLE users ADD COLUMN email TEXT;"
        );
        // Down blocks reverse: the last-defined block executes first
        assert_eq!(
            changeset.down_sql,
            "ALTER TABLE users DROP COLUMN email;;\n\nDROP TABLE users;"
        );
    }

    #[test]
    fn test_empty_file_fails() {
        let result = parse("");
        assert!(matches!(result, Err(Error::MissingUpSection(_))));
    }

    #[test]
    fn test_down_only_file_fails() {
        let result = parse("-- migrate:down\nDROP TABLE users;\n");
        assert!(matches!(result, Err(Error::MissingUpSection(_))));
    }

    #[test]
    fn test_no_markers_fails() {
        let result = parse("CREATE TABLE users (id INTEGER);\n");
        assert!(matches!(result, Err(Error::MissingUpSection(_))));
    }

    #[test]
    fn test_marker_variants() {
        // Case-insensitive, optional space after the comment token,
        // leading whitespace tolerated
        let content = "  -- MIGRATE:UP\n\
                       CREATE TABLE a (id INTEGER);\n\
                       --migrate:DOWN\n\
                       DROP TABLE a;\n";

        let changeset = parse(content).unwrap();
        assert_eq!(changeset.up_sql, "CREATE TABLE a (id INTEGER);");
        assert_eq!(changeset.down_sql, "DROP TABLE a;");
    }

    #[test]
    fn test_lines_before_first_marker_discarded() {
        let content = "-- This is a header comment\n\
                       SELECT 'ignored';\n\
                       -- migrate:up\n\
                       CREATE TABLE b (id INTEGER);\n";

        let changeset = parse(content).unwrap();
        assert_eq!(changeset.up_sql, "CREATE TABLE b (id INTEGER);");
        assert_eq!(changeset.down_sql, "");
    }

    #[test]
    fn test_comments_inside_sections_kept() {
        let content = "-- migrate:up\n\
                       -- create users\n\
                       CREATE TABLE users (id INTEGER);\n\
                       -- migrate:down\n\
                       -- drop users\n\
                       DROP TABLE users;\n";

        let changeset = parse(content).unwrap();
        assert!(changeset.up_sql.contains("-- create users"));
        assert!(changeset.up_sql.contains("CREATE TABLE users"));
        assert!(changeset.down_sql.contains("DROP TABLE users"));
    }

    #[test]
    fn test_empty_down_section_dropped() {
        let content = "-- migrate:up\n\
                       CREATE TABLE c (id INTEGER);\n\
                       -- migrate:down\n\
                       \n";

        let changeset = parse(content).unwrap();
        assert_eq!(changeset.down_sql, "");
    }

    #[test]
    fn test_parse_file_missing() {
        let result = Parser::new().parse_file("/nonexistent/001_x.sql");
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_parse_file_derives_id_from_filename() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("014_add_index.sql");
        write(&path, "-- migrate:up\nCREATE INDEX i ON t (c);\n").unwrap();

        let changeset = Parser::new().parse_file(&path).unwrap();
        assert_eq!(changeset.id, "014_add_index");
        assert_eq!(changeset.version(), Some(14));
        assert_eq!(changeset.source_path, path);
    }

    #[test]
    fn test_load_directory_missing() {
        let result = Parser::new().load_directory("/nonexistent/migrations");
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_load_directory_sorted_by_version() {
        let dir = TempDir::new().unwrap();
        for (name, table) in [("003_c.sql", "c"), ("001_a.sql", "a"), ("002_b.sql", "b")] {
            write(
                dir.path().join(name),
                format!("-- migrate:up\nCREATE TABLE {table} (id INTEGER);\n-- migrate:down\nDROP TABLE {table};\n"),
            )
            .unwrap();
        }

        let changesets = Parser::new().load_directory(dir.path()).unwrap();
        let ids: Vec<_> = changesets.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["001_a", "002_b", "003_c"]);
    }

    #[test]
    fn test_load_directory_unversioned_sort_after_versioned() {
        let dir = TempDir::new().unwrap();
        for name in ["zeta.sql", "002_b.sql", "alpha.sql", "001_a.sql"] {
            write(
                dir.path().join(name),
                "-- migrate:up\nCREATE TABLE t (id INTEGER);\n",
            )
            .unwrap();
        }

        let changesets = Parser::new().load_directory(dir.path()).unwrap();
        let ids: Vec<_> = changesets.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["001_a", "002_b", "alpha", "zeta"]);
    }

    #[test]
    fn test_load_directory_duplicate_id() {
        let dir = TempDir::new().unwrap();
        // Extension matching is case-insensitive, so these parse to the
        // same id
        write(
            dir.path().join("001_init.sql"),
            "-- migrate:up\nCREATE TABLE a (id INTEGER);\n",
        )
        .unwrap();
        write(
            dir.path().join("001_init.SQL"),
            "-- migrate:up\nCREATE TABLE b (id INTEGER);\n",
        )
        .unwrap();

        let result = Parser::new().load_directory(dir.path());
        match result {
            Err(Error::DuplicateMigration(id)) => assert_eq!(id, "001_init"),
            other => panic!("expected DuplicateMigration, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn test_load_directory_skips_hidden_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path().join("001_a.sql"),
            "-- migrate:up\nCREATE TABLE a (id INTEGER);\n",
        )
        .unwrap();
        write(dir.path().join(".hidden.sql"), "not a migration").unwrap();
        write(dir.path().join("README.md"), "docs").unwrap();

        let changesets = Parser::new().load_directory(dir.path()).unwrap();
        assert_eq!(changesets.len(), 1);
        assert_eq!(changesets[0].id, "001_a");
    }
}
