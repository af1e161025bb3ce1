//! CSV plumbing shared by the import and export drivers.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

/// A CSV file held in memory: header labels plus rows padded to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// `(header, cell)` pairs of one row.
    pub fn pairs<'a>(&'a self, row: &'a [String]) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.headers
            .iter()
            .zip(row.iter())
            .map(|(h, c)| (h.as_str(), c.as_str()))
    }
}

pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let width = headers.len();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        // Short rows are padded, extra cells past the header are dropped.
        row.resize(width, String::new());
        rows.push(row);
    }
    Ok(Table { headers, rows })
}

pub fn read_table_path(path: &Path) -> Result<Table> {
    let file = File::open(path).wrap_err_with(|| format!("cannot open {}", path.display()))?;
    read_table(file).wrap_err_with(|| format!("cannot parse {}", path.display()))
}

pub fn write_table<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `table` to `path`, creating parent directories.
pub fn write_table_path(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).wrap_err_with(|| format!("cannot create {}", path.display()))?;
    write_table(file, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded() {
        let data = "a,b,c\n1,2\n4,5,6,7\n";
        let t = read_table(data.as_bytes()).unwrap();
        assert_eq!(t.headers, vec!["a", "b", "c"]);
        assert_eq!(t.rows[0], vec!["1", "2", ""]);
        assert_eq!(t.rows[1], vec!["4", "5", "6"]);
        assert_eq!(t.column("c"), Some(2));
    }

    #[test]
    fn quoted_cells_survive_write_and_read() {
        let mut t = Table::new(vec!["Titre".into(), "Mots".into()]);
        t.rows.push(vec!["Eau, air".into(), "a|b".into()]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/data.csv");
        write_table_path(&path, &t).unwrap();
        let back = read_table_path(&path).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let data = "\u{feff}name_fr,name_en\nEau,Water\n";
        let t = read_table(data.as_bytes()).unwrap();
        assert_eq!(t.column("name_fr"), Some(0));
        let pairs: Vec<_> = t.pairs(&t.rows[0]).collect();
        assert_eq!(pairs, vec![("name_fr", "Eau"), ("name_en", "Water")]);
    }
}
